use clap::{ArgAction, Parser};

/// Extract files from CSAF archives
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Arg {
    /// Input archive file
    pub archive: Option<String>,
    /// Output directory (default: <ARCHIVE>_extract)
    pub output: Option<String>,
    #[arg(short, long)]
    /// Number of worker threads (default: number of logical CPUs)
    pub workers: Option<usize>,
    #[arg(long, action = ArgAction::SetTrue)]
    /// Verify the catalog checksum stored in the header
    pub verify_checksum: bool,
    #[arg(short, long, action = ArgAction::SetTrue)]
    /// Print debug messages
    pub verbose: bool,
    #[arg(short, long, action = ArgAction::SetTrue)]
    /// Print backtrace on error
    pub backtrace: bool,
}

pub fn parse_args() -> Arg {
    Arg::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let arg = Arg::try_parse_from([
            "csaf_tool",
            "-w",
            "3",
            "--verify-checksum",
            "-v",
            "data.dat",
            "out",
        ])
        .unwrap();
        assert_eq!(arg.archive.as_deref(), Some("data.dat"));
        assert_eq!(arg.output.as_deref(), Some("out"));
        assert_eq!(arg.workers, Some(3));
        assert!(arg.verify_checksum);
        assert!(arg.verbose);
        assert!(!arg.backtrace);
    }

    #[test]
    fn test_no_archive() {
        let arg = Arg::try_parse_from(["csaf_tool"]).unwrap();
        assert!(arg.archive.is_none());
        assert!(arg.output.is_none());
        assert!(Arg::try_parse_from(["csaf_tool", "-w", "many"]).is_err());
    }
}
