//! Version command implementation

use super::helpers::{Context, label};
use crate::cli::{VersionAction, VersionArgs};
use crate::error::Result;
use crate::version::{self, VersionInfo, VersionUpdate};

/// Run version command
pub fn run(context: &Context, args: &VersionArgs) -> Result<()> {
    let site = context.site()?;
    let path = site.version_path();

    let info = match &args.action {
        VersionAction::Show => VersionInfo::load(&path)?,
        VersionAction::Set(set) => {
            let update = VersionUpdate {
                public: set.public.clone(),
                local: set.local.clone(),
            };
            let info = version::update_file(&path, |info| info.apply(update))?;
            tracing::info!(public = %info.public, local = %info.local, "version updated");
            info
        }
    };

    context.emit(&info, print_version)
}

fn print_version(info: &VersionInfo) {
    println!("{} {}", label("Public:"), info.public);
    println!("{} {}", label("Local:"), info.local);
    println!("{} {}", label("Deploys:"), info.deploy_count);
    if let Some(last) = &info.last_deployed {
        println!("{} {last}", label("Last deployed:"));
    }
}
