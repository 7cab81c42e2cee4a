use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use image::ImageFormat;
use log::{debug, warn, LevelFilter};

use iiifmagick::backend::select_backend;
use iiifmagick::config::ServiceConfig;
use iiifmagick::coordinator::TransformCoordinator;
use iiifmagick::param_parsers::parse_request;
use iiifmagick::request::{Location, SourceDescriptor};
use iiifmagick::tiles::TileDescription;
use iiifmagick::version::version_string;

fn main() {
    if let Err(e) = real_main() {
        eprintln!("iiif-derive: {e}");
        std::process::exit(1);
    }
}

fn cli() -> Command {
    let source_args = [
        Arg::new("source")
            .help("Source image path, or a store key with --remote")
            .required(true)
            .index(1),
        Arg::new("media-type")
            .long("media-type")
            .help("Media type of the source; guessed from the file extension if omitted")
            .value_name("TYPE"),
        Arg::new("remote")
            .long("remote")
            .help("Fetch the source from the configured store_root")
            .action(ArgAction::SetTrue),
    ];

    Command::new("iiif-derive")
        .version(version_string())
        .about("Render IIIF Image API derivatives")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("TOML configuration file")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("backend")
                .long("backend")
                .help("Rendering backend (portable or native), overrides the configuration")
                .value_name("NAME")
                .global(true),
        )
        .arg(
            Arg::new("scratch-dir")
                .long("scratch-dir")
                .help("Directory for derivatives and temporary copies")
                .value_name("DIR")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable debug logging")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("render")
                .about("Render one derivative")
                .args(source_args.clone())
                .arg(
                    Arg::new("region")
                        .long("region")
                        .help("full, square, x,y,w,h or pct:x,y,w,h")
                        .default_value("full"),
                )
                .arg(
                    Arg::new("size")
                        .long("size")
                        .help("full, max, pct:n, `w,`, `,h`, `w,h` or `!w,h`")
                        .default_value("max"),
                )
                .arg(
                    Arg::new("rotation")
                        .long("rotation")
                        .help("Clockwise degrees, prefixed with ! to mirror first")
                        .default_value("0"),
                )
                .arg(
                    Arg::new("quality-format")
                        .long("quality-format")
                        .help("quality.format, e.g. gray.png")
                        .default_value("default.jpg"),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .help("Move the derivative here instead of printing its path")
                        .value_name("FILE")
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("tiles")
                .about("Print the tile description of a source as JSON")
                .args(source_args)
                .arg(
                    Arg::new("tile-size")
                        .long("tile-size")
                        .help("Tile edge in pixels, overrides the configuration")
                        .value_name("PIXELS")
                        .value_parser(value_parser!(u32)),
                ),
        )
        .subcommand(
            Command::new("capabilities").about("List the media types the backend reads and writes"),
        )
}

fn real_main() -> Result<(), Box<dyn Error>> {
    let matches = cli().get_matches();

    let level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => ServiceConfig::load(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(dir) = matches.get_one::<PathBuf>("scratch-dir") {
        config.scratch_dir = dir.clone();
    }
    let backend_name = matches
        .get_one::<String>("backend")
        .map(String::as_str)
        .unwrap_or(config.backend.name());
    debug!("using {config:?}");

    let backend = select_backend(backend_name, &config.formats, config.backend_context())?;
    let coordinator = TransformCoordinator::new(backend).with_max_area(config.max_area);

    match matches.subcommand() {
        Some(("render", args)) => render(&coordinator, args),
        Some(("tiles", args)) => tiles(&coordinator, &config, args),
        Some(("capabilities", _)) => {
            capabilities(&coordinator);
            Ok(())
        }
        _ => unreachable!("clap requires a subcommand"),
    }
}

fn source_descriptor(args: &ArgMatches) -> Result<SourceDescriptor, Box<dyn Error>> {
    let source = args
        .get_one::<String>("source")
        .ok_or("a source is required")?;
    let media_type = match args.get_one::<String>("media-type") {
        Some(media_type) => media_type.clone(),
        None => ImageFormat::from_path(source)
            .map_err(|_| format!("cannot guess the media type of `{source}', pass --media-type"))?
            .to_mime_type()
            .to_string(),
    };
    let location = if args.get_flag("remote") {
        Location::Remote(source.clone())
    } else {
        Location::Path(PathBuf::from(source))
    };
    Ok(SourceDescriptor::new(location, media_type))
}

fn render(coordinator: &TransformCoordinator, args: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let source = source_descriptor(args)?;
    let param = |name: &str| args.get_one::<String>(name).map(String::as_str).unwrap_or("");
    let request = parse_request(
        param("region"),
        param("size"),
        param("rotation"),
        param("quality-format"),
    )?;

    let derivative = coordinator.transform(&source, &request)?;
    match args.get_one::<PathBuf>("output") {
        Some(output) => move_file(&derivative, output)?,
        None => println!("{}", derivative.display()),
    }
    Ok(())
}

fn tiles(
    coordinator: &TransformCoordinator,
    config: &ServiceConfig,
    args: &ArgMatches,
) -> Result<(), Box<dyn Error>> {
    let source = source_descriptor(args)?;
    let tile_size = args
        .get_one::<u32>("tile-size")
        .copied()
        .unwrap_or(config.tile_size);
    let (width, height) = coordinator.backend().probe_dimensions(&source)?;
    println!("{}", TileDescription::new(width, height, tile_size).to_json()?);
    Ok(())
}

fn capabilities(coordinator: &TransformCoordinator) {
    let backend = coordinator.backend();
    println!("backend: {}", backend.kind());
    println!("reads:");
    for media_type in backend.capabilities().input_media_types() {
        println!("  {media_type}");
    }
    println!("writes:");
    for format in backend.capabilities().output_formats() {
        println!("  {:5} {}", format.extension(), format.media_type());
    }
}

/// The scratch directory may live on another filesystem, so fall back to copying.
/// The derivative is removed from scratch either way.
fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    if std::fs::rename(from, to).is_ok() {
        return Ok(());
    }
    let copied = std::fs::copy(from, to);
    if let Err(e) = std::fs::remove_file(from) {
        warn!("unable to remove {}: {e}", from.display());
    }
    copied.map(|_| ())
}
