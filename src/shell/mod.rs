use crate::session::{Navigation, SortOrder};

/// One line typed at the interactive prompt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Navigate(Navigation),
    Select(usize),
    Toggle(Vec<u64>),
    TogglePage,
    Clear,
    /// `None` cycles the title sort like a header click.
    Sort(Option<SortOrder>),
    ShowSelection,
    Export(String),
    Refresh,
    Help,
    Quit,
    Empty,
}

pub const HELP: &str = "\
Commands:
  n, next              go to the next page
  p, prev              go to the previous page
  page <N>, goto <N>   jump to page N
  s, select <N>        select the first N rows, starting at this page
  t, toggle <ID,...>   toggle rows on this page by id
  all                  toggle every row on this page
  clear                clear the selection
  sort [asc|desc|none] sort this page by title (no argument cycles)
  sel, selection       list the selected rows
  export <FILE>        write the selection (.txt, .json or .xml)
  r, refresh           reload the current page
  h, help, ?           show this help
  q, quit, exit        leave";

pub fn parse_command(line: &str) -> Result<Command, String> {
    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else {
        return Ok(Command::Empty);
    };
    let rest: Vec<&str> = parts.collect();

    let command = match head.to_lowercase().as_str() {
        "n" | "next" => {
            no_args(head, &rest)?;
            Command::Navigate(Navigation::Next)
        }
        "p" | "prev" | "previous" => {
            no_args(head, &rest)?;
            Command::Navigate(Navigation::Previous)
        }
        "page" | "goto" | "g" => {
            let page = single_number(head, &rest, "page number")?;
            if page == 0 {
                return Err("pages start at 1".to_string());
            }
            Command::Navigate(Navigation::Goto(page))
        }
        "s" | "select" => Command::Select(single_number(head, &rest, "row count")?),
        "t" | "toggle" => {
            if rest.is_empty() {
                return Err(format!("usage: {head} <ID,...>"));
            }
            Command::Toggle(crate::utils::parse_id_list_csv(&rest.join(","))?)
        }
        "all" => {
            no_args(head, &rest)?;
            Command::TogglePage
        }
        "clear" => {
            no_args(head, &rest)?;
            Command::Clear
        }
        "sort" => match rest.as_slice() {
            [] => Command::Sort(None),
            [order] => Command::Sort(Some(SortOrder::parse(order).ok_or_else(|| {
                format!("invalid sort order '{order}', expected asc, desc or none")
            })?)),
            _ => return Err("usage: sort [asc|desc|none]".to_string()),
        },
        "sel" | "selection" => {
            no_args(head, &rest)?;
            Command::ShowSelection
        }
        "export" => match rest.as_slice() {
            [path] => Command::Export(path.to_string()),
            _ => return Err("usage: export <FILE>".to_string()),
        },
        "r" | "refresh" => {
            no_args(head, &rest)?;
            Command::Refresh
        }
        "h" | "help" | "?" => Command::Help,
        "q" | "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command '{other}', type 'help'")),
    };
    Ok(command)
}

fn no_args(head: &str, rest: &[&str]) -> Result<(), String> {
    if rest.is_empty() {
        Ok(())
    } else {
        Err(format!("'{head}' takes no arguments"))
    }
}

fn single_number(head: &str, rest: &[&str], what: &str) -> Result<usize, String> {
    match rest {
        [raw] => raw
            .parse::<usize>()
            .map_err(|_| format!("invalid {what} '{raw}'")),
        _ => Err(format!("usage: {head} <N>")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigation_commands() {
        assert_eq!(parse_command("n"), Ok(Command::Navigate(Navigation::Next)));
        assert_eq!(parse_command(" PREV "), Ok(Command::Navigate(Navigation::Previous)));
        assert_eq!(parse_command("page 4"), Ok(Command::Navigate(Navigation::Goto(4))));
        assert!(parse_command("page 0").is_err());
        assert!(parse_command("page").is_err());
        assert!(parse_command("next 2").is_err());
    }

    #[test]
    fn select_takes_a_count() {
        assert_eq!(parse_command("select 15"), Ok(Command::Select(15)));
        assert_eq!(parse_command("s 0"), Ok(Command::Select(0)));
        assert!(parse_command("select -1").is_err());
        assert!(parse_command("select many").is_err());
    }

    #[test]
    fn toggle_accepts_commas_and_spaces() {
        assert_eq!(parse_command("t 1,2 3"), Ok(Command::Toggle(vec![1, 2, 3])));
        assert!(parse_command("toggle").is_err());
        assert!(parse_command("toggle x").is_err());
    }

    #[test]
    fn sort_and_misc() {
        assert_eq!(parse_command("sort"), Ok(Command::Sort(None)));
        assert_eq!(parse_command("sort desc"), Ok(Command::Sort(Some(SortOrder::Descending))));
        assert!(parse_command("sort up down").is_err());
        assert_eq!(parse_command("export out.json"), Ok(Command::Export("out.json".to_string())));
        assert_eq!(parse_command(""), Ok(Command::Empty));
        assert_eq!(parse_command("?"), Ok(Command::Help));
        assert_eq!(parse_command("exit"), Ok(Command::Quit));
        assert!(parse_command("frobnicate").is_err());
    }
}
