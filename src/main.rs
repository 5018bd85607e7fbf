use bpaf::{Parser, construct, long, short};
use owo_colors::OwoColorize;

use everdiff::filter::FilterOptions;
use everdiff::render::FormatOptions;
use everdiff::{compare, config, filter, render_detailed};

#[derive(Debug)]
struct Args {
    kubernetes: bool,
    ignore_order: bool,
    ignore_whitespace: bool,
    ignore_values: bool,
    detect_renames: bool,
    ignore_api_version: bool,
    additional_identifiers: Vec<String>,
    chroot: Option<String>,
    chroot_from: Option<String>,
    chroot_to: Option<String>,
    swap: bool,
    list_to_documents: bool,
    include: Vec<String>,
    include_pattern: Vec<String>,
    exclude: Vec<String>,
    exclude_pattern: Vec<String>,
    color: bool,
    true_color: bool,
    width: Option<usize>,
    verbosity: usize,
    left: camino::Utf8PathBuf,
    right: camino::Utf8PathBuf,
}

fn args() -> impl Parser<Args> {
    let kubernetes = short('k')
        .long("kubernetes")
        .help("Match documents by Kubernetes apiVersion/kind/namespace/name")
        .switch();

    let ignore_order = short('m')
        .long("ignore-order")
        .help("Don't report list-reorder-only changes")
        .switch();

    let ignore_whitespace = short('w')
        .long("ignore-whitespace")
        .help("Don't report whitespace-only scalar changes")
        .switch();

    let ignore_values = long("ignore-values")
        .help("Report additions and removals but not value changes")
        .switch();

    let detect_renames = short('r')
        .long("detect-renames")
        .help("Match unidentified list items by content similarity")
        .switch();

    let ignore_api_version = long("ignore-api-version")
        .help("Ignore apiVersion when matching Kubernetes resources")
        .switch();

    let additional_identifiers = long("identifier")
        .help("Additional key to try as a list item identifier, in priority order")
        .argument::<String>("KEY")
        .many();

    let chroot = long("chroot")
        .help("Narrow comparison to the value at this dotted path before diffing")
        .argument::<String>("PATH")
        .optional();

    let chroot_from = long("chroot-from")
        .help("Overrides --chroot for the left file only")
        .argument::<String>("PATH")
        .optional();

    let chroot_to = long("chroot-to")
        .help("Overrides --chroot for the right file only")
        .argument::<String>("PATH")
        .optional();

    let swap = long("swap")
        .help("Compare right against left and report the mirrored diff")
        .switch();

    let list_to_documents = long("list-to-documents")
        .help("Treat a chroot'd list as a sequence of documents")
        .switch();

    let include = short('i')
        .long("include")
        .help("Only report differences under this path prefix")
        .argument::<String>("PATH")
        .many();

    let include_pattern = long("include-pattern")
        .help("Only report differences whose path matches this regex")
        .argument::<String>("REGEX")
        .many();

    let exclude = short('x')
        .long("exclude")
        .help("Never report differences under this path prefix")
        .argument::<String>("PATH")
        .many();

    let exclude_pattern = long("exclude-pattern")
        .help("Never report differences whose path matches this regex")
        .argument::<String>("REGEX")
        .many();

    let color = short('c')
        .long("color")
        .help("Colorize the rendered report")
        .switch();

    let true_color = long("true-color")
        .help("Use 24-bit color instead of the 4-bit palette")
        .switch();

    let width = long("width")
        .help("Wrap multiline diffs to this width instead of the terminal's")
        .argument::<usize>("COLUMNS")
        .optional();

    let verbosity = short('v')
        .long("verbose")
        .help("Increase verbosity level (can be repeated)")
        .req_flag(())
        .many()
        .map(|v| v.len());

    let left = short('l')
        .long("left")
        .help("Left file to compare")
        .argument::<camino::Utf8PathBuf>("PATH");

    let right = short('R')
        .long("right")
        .help("Right file to compare")
        .argument::<camino::Utf8PathBuf>("PATH");

    construct!(Args {
        kubernetes,
        ignore_order,
        ignore_whitespace,
        ignore_values,
        detect_renames,
        ignore_api_version,
        additional_identifiers,
        chroot,
        chroot_from,
        chroot_to,
        swap,
        list_to_documents,
        include,
        include_pattern,
        exclude,
        exclude_pattern,
        color,
        true_color,
        width,
        verbosity,
        left,
        right,
    })
}

fn main() -> anyhow::Result<()> {
    let args = args()
        .to_options()
        .descr("Structural difference between two YAML documents")
        .run();

    setup_logging(args.verbosity)?;
    log::debug!("Starting everdiff with args: {:?}", args);

    // A checked-in everdiff.config.yaml supplies defaults; explicit flags
    // below always take precedence over it.
    let mut options = config::config_from_env().unwrap_or_default();
    options.ignore_order_changes |= args.ignore_order;
    options.ignore_whitespace_changes |= args.ignore_whitespace;
    options.ignore_value_changes |= args.ignore_values;
    options.detect_kubernetes |= args.kubernetes;
    options.detect_renames |= args.detect_renames;
    options.ignore_api_version |= args.ignore_api_version;
    options.additional_identifiers.extend(args.additional_identifiers);
    options.list_to_documents |= args.list_to_documents;
    options.swap |= args.swap;
    if args.chroot.is_some() {
        options.chroot = args.chroot;
    }
    if args.chroot_from.is_some() {
        options.chroot_from = args.chroot_from;
    }
    if args.chroot_to.is_some() {
        options.chroot_to = args.chroot_to;
    }

    let left = std::fs::read(&args.left)?;
    let right = std::fs::read(&args.right)?;

    let diffs = compare(&left, &right, &options)?;
    let diffs = filter(
        diffs,
        &FilterOptions {
            include_paths: args.include,
            include_patterns: args.include_pattern,
            exclude_paths: args.exclude,
            exclude_patterns: args.exclude_pattern,
        },
    )?;

    let width = args
        .width
        .or_else(|| termsize::get().map(|size| size.cols as usize))
        .unwrap_or(80);

    let format = FormatOptions {
        width,
        color: args.color,
        true_color: args.true_color,
        ..FormatOptions::default()
    };

    print!("{}", render_detailed(&diffs, &format));

    Ok(())
}

fn setup_logging(verbosity: usize) -> Result<(), anyhow::Error> {
    let mut base_config = fern::Dispatch::new().format(move |out, message, record| {
        let level = match record.level() {
            log::Level::Error => "ERROR".red().to_string(),
            log::Level::Warn => "WARN".yellow().to_string(),
            log::Level::Info => "INFO".blue().to_string(),
            log::Level::Debug => "DEBUG".green().to_string(),
            log::Level::Trace => "TRACE".magenta().to_string(),
        };

        let module = record.module_path().unwrap_or("unknown");

        out.finish(format_args!("{level}:{module}: {message}"))
    });

    base_config = match verbosity {
        0 => base_config.level(log::LevelFilter::Warn),
        1 => base_config.level(log::LevelFilter::Info),
        2 => base_config.level(log::LevelFilter::Debug),
        _ => base_config.level(log::LevelFilter::Trace),
    };
    base_config.chain(std::io::stderr()).apply()?;

    Ok(())
}
