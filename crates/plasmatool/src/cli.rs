use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "plasmatool",
    author,
    version,
    about = "Offscreen plasma effect frame exporter"
)]
pub struct Cli {
    /// Effect manifest (`effect.toml`) describing tile dimensions,
    /// transform, and paint color. Overrides --tile and --color.
    #[arg(long, value_name = "FILE")]
    pub manifest: Option<PathBuf>,

    /// Output directory for rendered frames.
    #[arg(long, value_name = "DIR", default_value = "frames")]
    pub output: PathBuf,

    /// Number of frames to render; the animation phase advances by 0.1
    /// per frame.
    #[arg(long, default_value_t = 1)]
    pub frames: u32,

    /// Frame size as WIDTHxHEIGHT pixels.
    #[arg(long, value_name = "WxH", default_value = "512x512", value_parser = parse_size)]
    pub size: (u32, u32),

    /// Tile dimensions in user-space units when no manifest is given.
    #[arg(long, value_name = "WxH", default_value = "100x100", value_parser = parse_tile)]
    pub tile: (f64, f64),

    /// Paint color as R,G,B,A bytes when no manifest is given.
    #[arg(long, value_name = "R,G,B,A", default_value = "255,255,255,255", value_parser = parse_color)]
    pub color: [u8; 4],
}

pub fn parse() -> Cli {
    Cli::parse()
}

fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let (width, height) = split_pair(value)?;
    let width: u32 = width
        .parse()
        .map_err(|_| format!("invalid width in `{value}`"))?;
    let height: u32 = height
        .parse()
        .map_err(|_| format!("invalid height in `{value}`"))?;
    if width == 0 || height == 0 {
        return Err(format!("size must be non-zero, got `{value}`"));
    }
    Ok((width, height))
}

fn parse_tile(value: &str) -> Result<(f64, f64), String> {
    let (width, height) = split_pair(value)?;
    let width: f64 = width
        .parse()
        .map_err(|_| format!("invalid tile width in `{value}`"))?;
    let height: f64 = height
        .parse()
        .map_err(|_| format!("invalid tile height in `{value}`"))?;
    if width == 0.0 || height == 0.0 {
        return Err(format!("tile dimensions must be non-zero, got `{value}`"));
    }
    Ok((width, height))
}

fn split_pair(value: &str) -> Result<(&str, &str), String> {
    value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got `{value}`"))
}

fn parse_color(value: &str) -> Result<[u8; 4], String> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    if parts.len() != 4 {
        return Err(format!("expected R,G,B,A bytes, got `{value}`"));
    }
    let mut color = [0u8; 4];
    for (slot, part) in color.iter_mut().zip(&parts) {
        *slot = part
            .parse()
            .map_err(|_| format!("invalid color channel `{part}` in `{value}`"))?;
    }
    Ok(color)
}
