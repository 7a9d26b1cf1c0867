// Command-line arguments
use clap::Parser;
use std::path::PathBuf;

use crate::motion::permission::SensorPermission;
use crate::motion::simulator::ShakeProfile;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "shakeplay")]
#[command(about = "Loops an audio clip faster the harder you shake", long_about = None)]
pub struct Args {
    /// Audio file to loop
    #[arg(value_name = "ASSET")]
    pub asset: PathBuf,

    /// JSON settings file; built-in defaults are used when absent
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Generate motion events instead of waiting for them on stdin
    #[arg(long, value_enum, value_name = "PROFILE")]
    pub simulate: Option<ShakeProfile>,

    /// Outcome of the motion sensor permission prompt
    #[arg(long, value_enum, default_value = "implicit")]
    pub sensor_permission: SensorPermission,

    /// Start playing as soon as the clip is loaded
    #[arg(long)]
    pub autoplay: bool,
}
