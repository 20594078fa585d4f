use crate::cli::args::CliArgs;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if args.page == Some(0) {
        return Err("invalid page, expected positive integer".to_string());
    }
    if args.select == Some(0) {
        return Err("invalid select count, expected positive integer".to_string());
    }
    if args.rate == Some(0) {
        return Err("invalid rate, expected positive integer".to_string());
    }
    if args.timeout == Some(0) {
        return Err("invalid timeout, expected positive integer".to_string());
    }
    if let Some(prefetch) = args.prefetch {
        if prefetch == 0 || prefetch > crate::viewer::MAX_PREFETCH {
            return Err(format!(
                "invalid prefetch, expected 1 to {}",
                crate::viewer::MAX_PREFETCH
            ));
        }
    }
    if let Some(raw) = args.sort.as_deref() {
        crate::session::SortOrder::parse(raw)
            .ok_or_else(|| format!("invalid --sort '{raw}', expected asc, desc or none"))?;
    }
    if let Some(raw) = args.output_format.as_deref() {
        crate::output::OutputFormat::parse(raw)
            .ok_or_else(|| format!("invalid --output-format '{raw}', expected text, json or xml"))?;
    }
    Ok(())
}
