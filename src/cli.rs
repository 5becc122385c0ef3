//! Command-line arguments of the headless renderer.

use anyhow::{anyhow, bail, Context};
use std::path::PathBuf;

pub const USAGE: &str = "usage: ridingmap <map.json> <out.png> [width] [height] [--config <file>]";

pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 600;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub map: PathBuf,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub config: Option<PathBuf>,
}

impl CliArgs {
    /// Parse arguments, excluding the program name.
    pub fn parse<I>(args: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut positional = Vec::new();
        let mut config = None;
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            if arg == "--config" {
                let file = args
                    .next()
                    .ok_or_else(|| anyhow!("--config needs a file\n{}", USAGE))?;
                config = Some(PathBuf::from(file));
            } else if arg.starts_with("--") {
                bail!("unknown option {}\n{}", arg, USAGE);
            } else {
                positional.push(arg);
            }
        }

        if positional.len() < 2 || positional.len() > 4 {
            bail!("{}", USAGE);
        }
        let dimension = |index: usize, default: u32, name: &str| -> anyhow::Result<u32> {
            match positional.get(index) {
                Some(text) => {
                    let value: u32 = text
                        .parse()
                        .with_context(|| format!("invalid {} {:?}", name, text))?;
                    if value == 0 {
                        bail!("{} must be > 0", name);
                    }
                    Ok(value)
                }
                None => Ok(default),
            }
        };

        Ok(Self {
            width: dimension(2, DEFAULT_WIDTH, "width")?,
            height: dimension(3, DEFAULT_HEIGHT, "height")?,
            map: PathBuf::from(&positional[0]),
            output: PathBuf::from(&positional[1]),
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_defaults() {
        let cli = CliArgs::parse(args(&["map.json", "out.png"])).unwrap();
        assert_eq!(cli.width, DEFAULT_WIDTH);
        assert_eq!(cli.height, DEFAULT_HEIGHT);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_size_and_config() {
        let cli = CliArgs::parse(args(&[
            "--config",
            "render.toml",
            "map.json",
            "out.png",
            "320",
            "200",
        ]))
        .unwrap();
        assert_eq!((cli.width, cli.height), (320, 200));
        assert_eq!(cli.config, Some(PathBuf::from("render.toml")));
        assert_eq!(cli.map, PathBuf::from("map.json"));
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(CliArgs::parse(args(&["map.json"])).is_err());
        assert!(CliArgs::parse(args(&["map.json", "out.png", "wide"])).is_err());
        assert!(CliArgs::parse(args(&["map.json", "out.png", "0"])).is_err());
        assert!(CliArgs::parse(args(&["map.json", "out.png", "--config"])).is_err());
        assert!(CliArgs::parse(args(&["map.json", "out.png", "--verbose"])).is_err());
    }
}
