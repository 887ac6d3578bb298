use clap::Parser;

use wcs_core::SimConfig;

use crate::{Cli, load_config};

#[cfg(test)]
mod cli_tests {
    use super::*;

    #[test]
    fn sample_config_matches_defaults() {
        let sample = SimConfig::from_toml_str(include_str!("../config.toml")).unwrap();
        assert_eq!(sample, SimConfig::default());
    }

    #[test]
    fn defaults_without_arguments() {
        let cli = Cli::try_parse_from(["wastesim"]).unwrap();
        assert_eq!(cli.results.to_str(), Some("simulation_results.csv"));
        assert!(cli.frames.is_none());
        assert_eq!(load_config(&cli).unwrap(), SimConfig::default());
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::try_parse_from(["wastesim", "--days", "2", "--seed", "99", "--live-seed", "7"]).unwrap();
        let config = load_config(&cli).unwrap();
        assert_eq!(config.simulation.days, 2);
        assert_eq!(config.simulation.seed, 99);
        assert_eq!(config.simulation.live_seed, Some(7));
    }

    #[test]
    fn missing_config_file_reported() {
        let cli = Cli::try_parse_from(["wastesim", "--config", "/nonexistent/city.toml"]).unwrap();
        let err = load_config(&cli).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/city.toml"));
    }
}
