use std::io::Write;
use std::time::Duration;

use clap::{error::ErrorKind, Parser};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::fs::OpenOptions;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::api::{Record, DEFAULT_BASE_URL};
use crate::cli::args::CliArgs;
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::fetcher::PageFetcher;
use crate::output::{self, table::TableOptions};
use crate::session::SortOrder;
use crate::shell::{self, Command};
use crate::viewer::{Options, Viewer, ViewerError, MAX_PREFETCH};

fn print_banner() {
    const BANNER: &str = r#"
                  __
  ____ ______/ /_____  ____ _____ ____  _____
 / __ `/ ___/ __/ __ \/ __ `/ __ `/ _ \/ ___/
/ /_/ / /  / /_/ /_/ / /_/ / /_/ /  __/ /
\__,_/_/   \__/ .___/\__,_/\__, /\___/_/
             /_/          /____/
    "#;
    println!("{}  v{}", BANNER, env!("CARGO_PKG_VERSION"));
}

fn format_kv_line(label: &str, value: &str) {
    println!(":: {:<10}: {}", label, value);
}

fn print_tagged(tag: colored::ColoredString, message: &str) {
    println!(
        "{}{}{} {}",
        "[".bold().white(),
        tag,
        "]".bold().white(),
        message
    );
}

fn print_info(message: &str) {
    print_tagged("INF".bold().blue(), message);
}

fn print_warn(message: &str) {
    print_tagged("WRN".bold().yellow(), message);
}

fn print_error(message: &str) {
    print_tagged("ERR".bold().red(), message);
}

#[derive(Clone, Debug)]
struct RunConfig {
    options: Options,
    select: Option<usize>,
    sort: SortOrder,
    interactive: bool,
    output: Option<String>,
    output_format: Option<String>,
    no_color: bool,
    max_width: Option<usize>,
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = if args.color {
        false
    } else {
        args.no_color || cfg.no_color.unwrap_or(false)
    };

    let base_url = crate::utils::trim_base_url(
        &args
            .base_url
            .or(cfg.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
    );
    if reqwest::Url::parse(&base_url).is_err() {
        return Err(format!("invalid base URL '{base_url}'"));
    }

    let start_page = args.page.or(cfg.page).unwrap_or(1);
    if start_page == 0 {
        return Err("invalid page, expected positive integer".to_string());
    }

    let rate = args.rate.or(cfg.rate);
    if rate == Some(0) {
        return Err("invalid rate, expected positive integer".to_string());
    }
    let timeout_seconds = args.timeout.or(cfg.timeout);
    if timeout_seconds == Some(0) {
        return Err("invalid timeout, expected positive integer".to_string());
    }
    let proxy = args
        .proxy
        .or(cfg.proxy)
        .filter(|p| !p.trim().is_empty());

    let prefetch = args.prefetch.or(cfg.prefetch).unwrap_or(1);
    if prefetch == 0 || prefetch > MAX_PREFETCH {
        return Err(format!("invalid prefetch, expected 1 to {MAX_PREFETCH}"));
    }

    let sort = match args.sort.or(cfg.sort) {
        Some(raw) => SortOrder::parse(&raw)
            .ok_or_else(|| format!("invalid sort '{raw}', expected asc, desc or none"))?,
        None => SortOrder::None,
    };

    let output = args
        .output
        .or(cfg.output)
        .map(|p| config::expand_tilde_string(&p));
    let output_format = args.output_format.or(cfg.output_format);
    if let Some(raw) = output_format.as_deref() {
        output::OutputFormat::parse(raw)
            .ok_or_else(|| format!("invalid output format '{raw}', expected text, json or xml"))?;
    }

    let max_width = match args.max_width.or(cfg.max_width).unwrap_or(160) {
        0 => None,
        width => Some(width),
    };

    Ok(RunConfig {
        options: Options {
            base_url,
            start_page,
            rate,
            timeout_seconds,
            proxy,
            prefetch,
        },
        select: args.select,
        sort,
        interactive: !args.no_interactive,
        output,
        output_format,
        no_color,
        max_width,
    })
}

fn init_tracing(verbose: u8) -> Result<(), String> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_env("ARTPAGER_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("artpager={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| format!("failed to initialize logging: {e}"))
}

#[derive(Clone, Debug)]
struct ViewSettings {
    table: TableOptions,
    output_format: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

fn render<F: PageFetcher>(viewer: &Viewer<F>, view: &ViewSettings) {
    println!();
    println!(
        "{}",
        output::table::render_page(viewer.state(), view.table)
    );
}

fn report_load(result: Result<usize, ViewerError>) {
    match result {
        Ok(_) => {}
        Err(ViewerError::Fetch(e)) => print_warn(&format!("{e}; showing an empty page")),
        Err(e) => print_error(&e.to_string()),
    }
}

fn print_selection(records: &[Record]) {
    if records.is_empty() {
        print_info("nothing selected");
        return;
    }
    for r in records {
        println!("  {:>8}  {}", r.id.to_string().cyan(), r.title);
    }
    print_info(&format!("{} selected", records.len()));
}

async fn run_select<F: PageFetcher>(
    viewer: &mut Viewer<F>,
    n: usize,
) -> Result<(), ViewerError> {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.blue} {elapsed} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(format!("selecting the first {n} rows"));

    let result = viewer.select_first_n(n).await;
    pb.finish_and_clear();

    let run = result?;
    print_info(&format!(
        "selected {} of {} requested rows ({} extra page(s) fetched)",
        run.len(),
        n,
        run.pages_fetched.len()
    ));
    if run.is_short(n) {
        print_warn(&format!(
            "selection is short by {} (failed pages: {:?})",
            n.saturating_sub(run.len()),
            run.failed_pages
        ));
    }
    Ok(())
}

async fn export_selection(
    path: &str,
    explicit_format: Option<&str>,
    records: &[Record],
) -> Result<(), String> {
    let format = output::resolve_format(explicit_format, path)?;
    let rendered = output::render(format, records);
    let mut outfile = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .await
        .map_err(|e| format!("failed to open output file '{path}': {e}"))?;
    outfile
        .write_all(&rendered)
        .await
        .map_err(|e| format!("failed to write output file '{path}': {e}"))?;
    outfile
        .flush()
        .await
        .map_err(|e| format!("failed to write output file '{path}': {e}"))?;
    Ok(())
}

async fn handle_command<F: PageFetcher>(
    viewer: &mut Viewer<F>,
    command: Command,
    view: &ViewSettings,
) -> Flow {
    match command {
        Command::Empty => {}
        Command::Quit => return Flow::Quit,
        Command::Help => println!("{}", shell::HELP),
        Command::Navigate(nav) => {
            report_load(viewer.navigate(nav).await);
            render(viewer, view);
        }
        Command::Refresh => {
            report_load(viewer.refresh().await);
            render(viewer, view);
        }
        Command::Select(n) => {
            if let Err(e) = run_select(viewer, n).await {
                print_error(&e.to_string());
            }
            render(viewer, view);
        }
        Command::Toggle(ids) => {
            let outcome = viewer.state_mut().toggle_rows(&ids);
            if !outcome.unknown.is_empty() {
                print_warn(&format!("not on this page: {:?}", outcome.unknown));
            }
            render(viewer, view);
        }
        Command::TogglePage => {
            viewer.state_mut().toggle_page();
            render(viewer, view);
        }
        Command::Clear => {
            viewer.state_mut().clear_selection();
            render(viewer, view);
        }
        Command::Sort(order) => {
            let next = order.unwrap_or_else(|| viewer.state().sort().cycle());
            viewer.state_mut().set_sort(next);
            render(viewer, view);
        }
        Command::ShowSelection => print_selection(viewer.state().selection().records()),
        Command::Export(path) => {
            let path = config::expand_tilde_string(&path);
            let records = viewer.state().selection().records();
            match export_selection(&path, view.output_format.as_deref(), records).await {
                Ok(()) => print_info(&format!("wrote {} row(s) to {path}", records.len())),
                Err(e) => print_error(&e),
            }
        }
    }
    Flow::Continue
}

async fn run_shell<F: PageFetcher>(
    viewer: &mut Viewer<F>,
    view: &ViewSettings,
) -> Result<(), String> {
    print_info("type 'help' for commands");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", "artpager>".bold().green());
        std::io::stdout()
            .flush()
            .map_err(|e| format!("failed to write prompt: {e}"))?;

        let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| format!("failed to read input: {e}"))?
        else {
            println!();
            break;
        };
        let command = match shell::parse_command(&line) {
            Ok(command) => command,
            Err(e) => {
                print_error(&e);
                continue;
            }
        };
        if handle_command(viewer, command, view).await == Flow::Quit {
            break;
        }
    }
    Ok(())
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.no_color {
        colored::control::set_override(false);
    }
    print_banner();

    format_kv_line("API", &run.options.base_url);
    format_kv_line("Page", &run.options.start_page.to_string());
    format_kv_line("Prefetch", &run.options.prefetch.to_string());
    format_kv_line(
        "Rate",
        &run.options
            .rate
            .map(|r| format!("{r}/s"))
            .unwrap_or_else(|| "unlimited".to_string()),
    );
    println!();

    let view = ViewSettings {
        table: TableOptions {
            max_width: run.max_width,
            color: !run.no_color,
        },
        output_format: run.output_format.clone(),
    };

    let mut viewer = Viewer::new(run.options.clone()).map_err(|e| e.to_string())?;
    viewer.state_mut().set_sort(run.sort);
    report_load(viewer.open().await);

    if let Some(n) = run.select {
        if let Err(e) = run_select(&mut viewer, n).await {
            if !run.interactive {
                return Err(e.to_string());
            }
            print_error(&e.to_string());
        }
    }
    render(&viewer, &view);

    if run.interactive {
        run_shell(&mut viewer, &view).await?;
    } else if run.select.is_some() && run.output.is_none() {
        print_selection(viewer.state().selection().records());
    }

    if let Some(path) = run.output.as_deref() {
        let records = viewer.state().selection().records();
        export_selection(path, run.output_format.as_deref(), records).await?;
        print_info(&format!("wrote {} row(s) to {path}", records.len()));
    }
    Ok(())
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{e}");
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    if args.init_config {
        let path = args
            .config
            .as_deref()
            .map(config::expand_tilde)
            .or_else(config::default_config_path)
            .ok_or_else(|| "could not determine the config path".to_string())?;
        if config::ensure_default_config_file(&path)? {
            println!("wrote {}", path.display());
        } else {
            println!("config already exists at {}", path.display());
        }
        return Ok(());
    }

    let cfg = match args.config.as_deref() {
        Some(path) => config::load_config(&config::expand_tilde(path), false)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };

    init_tracing(args.verbose)?;
    let run = build_run_config(args, cfg)?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))
}
