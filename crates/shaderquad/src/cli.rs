use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "shaderquad",
    author,
    version,
    about = "Desktop playground for GLSL fragment shaders",
    arg_required_else_help = false
)]
pub struct Cli {
    /// Path to the fragment shader to render.
    #[arg(value_name = "SHADER")]
    pub shader: Option<PathBuf>,

    /// Override the surface resolution (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT")]
    pub size: Option<String>,

    /// Optional FPS cap for the preview loop (0 = uncapped).
    #[arg(long, value_name = "FPS")]
    pub fps: Option<f32>,

    /// TOML config file supplying defaults for the flags above.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Clear color applied before each draw, as `r,g,b` or `r,g,b,a` floats.
    #[arg(long, value_name = "R,G,B[,A]")]
    pub clear: Option<String>,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_surface_size(spec: &str) -> Result<(u32, u32)> {
    let trimmed = spec.trim();
    let (width, height) = trimmed
        .split_once(['x', 'X'])
        .ok_or_else(|| anyhow::anyhow!("expected WxH format, e.g. 1280x720"))?;

    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid width in size specification"))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid height in size specification"))?;

    if width == 0 || height == 0 {
        anyhow::bail!("surface dimensions must be greater than zero");
    }

    Ok((width, height))
}

pub fn parse_clear_color(spec: &str) -> Result<[f64; 4]> {
    let components: Vec<f64> = spec
        .split(',')
        .map(|part| {
            part.trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("invalid clear color component `{}`", part.trim()))
        })
        .collect::<Result<_>>()?;

    match components.as_slice() {
        [r, g, b] => Ok([*r, *g, *b, 1.0]),
        [r, g, b, a] => Ok([*r, *g, *b, *a]),
        _ => anyhow::bail!("expected 3 or 4 comma-separated clear color components"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_sizes() {
        assert_eq!(parse_surface_size("1280x720").unwrap(), (1280, 720));
        assert_eq!(parse_surface_size(" 640 X 480 ").unwrap(), (640, 480));
    }

    #[test]
    fn rejects_malformed_sizes() {
        assert!(parse_surface_size("1280").is_err());
        assert!(parse_surface_size("axb").is_err());
        assert!(parse_surface_size("0x480").is_err());
    }

    #[test]
    fn parses_clear_colors_with_optional_alpha() {
        assert_eq!(
            parse_clear_color("0.1, 0.2, 0.3").unwrap(),
            [0.1, 0.2, 0.3, 1.0]
        );
        assert_eq!(parse_clear_color("1,0,0,0.5").unwrap(), [1.0, 0.0, 0.0, 0.5]);
    }

    #[test]
    fn rejects_malformed_clear_colors() {
        assert!(parse_clear_color("0.1,0.2").is_err());
        assert!(parse_clear_color("red,green,blue").is_err());
    }
}
