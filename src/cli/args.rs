use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "artpager",
    version,
    about = "paginated terminal viewer for the Art Institute of Chicago artworks API",
    long_about = "artpager pages through the public artworks listing twelve rows at a time, lets you mark rows across pages and can select the first N rows of the collection starting at the current page.\n\nExamples:\n  artpager\n  artpager -p 40 --sort asc\n  artpager -p 3 -s 30 -n -o selection.json\n  artpager --config ~/.artpager/config.yml\n\nTip: Use --init-config to write a commented default config file."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "vb",
        visible_alias = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase log verbosity (-v, -vv)."
    )]
    pub verbose: u8,

    #[arg(
        short = 'c',
        long = "clr",
        visible_alias = "color",
        help_heading = "Output",
        help = "Enable colored output (overrides --no-color)."
    )]
    pub color: bool,

    #[arg(
        long = "nc",
        visible_alias = "no-color",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'w',
        long = "mw",
        visible_alias = "max-width",
        value_name = "COLUMNS",
        help_heading = "Output",
        help = "Maximum table width in characters (0 = unlimited)."
    )]
    pub max_width: Option<usize>,

    #[arg(
        short = 'o',
        long = "out",
        visible_alias = "output",
        value_name = "FILE",
        help_heading = "Output",
        help = "Write the final selection to a file."
    )]
    pub output: Option<String>,

    #[arg(
        long = "of",
        visible_alias = "output-format",
        value_name = "FORMAT",
        help_heading = "Output",
        help = "Selection file format: text, json or xml (defaults to the file extension)."
    )]
    pub output_format: Option<String>,

    #[arg(
        short = 'C',
        long = "cfg",
        visible_alias = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.artpager/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "ic",
        visible_alias = "init-config",
        help_heading = "Input",
        help = "Write a default config file (if missing) and exit."
    )]
    pub init_config: bool,

    #[arg(
        short = 'p',
        long = "pg",
        visible_alias = "page",
        value_name = "N",
        help_heading = "View",
        help = "Page to open first (1-based)."
    )]
    pub page: Option<usize>,

    #[arg(
        short = 's',
        long = "sel",
        visible_alias = "select",
        value_name = "N",
        help_heading = "View",
        help = "Select the first N rows starting at the opened page."
    )]
    pub select: Option<usize>,

    #[arg(
        long = "srt",
        visible_alias = "sort",
        value_name = "ORDER",
        help_heading = "View",
        help = "Sort displayed rows by title: asc, desc or none."
    )]
    pub sort: Option<String>,

    #[arg(
        short = 'n',
        long = "ni",
        visible_alias = "no-interactive",
        help_heading = "View",
        help = "Print the opened page (and selection) and exit instead of starting the prompt."
    )]
    pub no_interactive: bool,

    #[arg(
        short = 'b',
        long = "bu",
        visible_alias = "base-url",
        value_name = "URL",
        help_heading = "HTTP",
        help = "API base URL (default https://api.artic.edu/api/v1)."
    )]
    pub base_url: Option<String>,

    #[arg(
        short = 'x',
        long = "px",
        visible_alias = "proxy",
        value_name = "URL",
        help_heading = "HTTP",
        help = "HTTP proxy URL (e.g. http://127.0.0.1:8080)."
    )]
    pub proxy: Option<String>,

    #[arg(
        short = 'T',
        long = "to",
        visible_alias = "timeout",
        value_name = "SECONDS",
        help_heading = "HTTP",
        help = "Per-request timeout in seconds (default: none)."
    )]
    pub timeout: Option<u64>,

    #[arg(
        short = 'r',
        long = "rt",
        visible_alias = "rate",
        value_name = "RPS",
        help_heading = "Performance",
        help = "Request rate limit (requests per second)."
    )]
    pub rate: Option<u32>,

    #[arg(
        long = "pf",
        visible_alias = "prefetch",
        value_name = "N",
        help_heading = "Performance",
        help = "Pages a select run may fetch at once (1 = one page at a time)."
    )]
    pub prefetch: Option<usize>,
}
