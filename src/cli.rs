use clap::Parser;

use crate::utils::version;

#[derive(Parser, Debug)]
#[command(author, version = version(), about)]
pub struct Cli {
    /// Game ticks per second
    #[arg(short, long, value_name = "FLOAT", default_value_t = 60.0)]
    pub tick_rate: f64,

    /// Frames per second
    #[arg(short, long, value_name = "FLOAT", default_value_t = 60.0)]
    pub frame_rate: f64,

    /// Seed for pipe placement, random when omitted
    #[arg(short, long, value_name = "INT")]
    pub seed: Option<u64>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["flappy-rs"]);
        assert_eq!(cli.tick_rate, 60.0);
        assert_eq!(cli.frame_rate, 60.0);
        assert_eq!(cli.seed, None);
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::parse_from(["flappy-rs", "-t", "30", "--frame-rate", "24", "--seed", "42"]);
        assert_eq!(cli.tick_rate, 30.0);
        assert_eq!(cli.frame_rate, 24.0);
        assert_eq!(cli.seed, Some(42));
    }
}
