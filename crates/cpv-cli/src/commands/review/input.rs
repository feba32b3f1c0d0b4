//! Line commands accepted by the interactive review loop.

use std::str::FromStr;

use cpv_core::{MethodTag, Variability};

pub const HELP: &str = "\
commands:
  next | n                 save, then open the next queue entry
  prev | p                 save, then open the previous queue entry
  goto <n>                 save, then open queue entry n (1-based)
  open <identifier>        save, then open any checkplot by identifier
  flag <yes|no|?>          set the variability flag
  select <method> <slot>   adopt a candidate period (e.g. select gls 0)
  period <days|->          type a period by hand (- clears it)
  epoch <value|->          type an epoch by hand (- clears it)
  vartags <text>           set variability tags
  tags <text>              set object tags
  comment <text>           set the object comments
  save | s                 save the current checkplot
  panels                   list the current panels
  status                   show the current checkplot and edit form
  queue                    list the review queue
  help | ?                 show this help
  quit | q                 save and exit";

#[derive(Debug, Clone, PartialEq)]
pub enum ReviewCommand {
    Next,
    Previous,
    /// Zero-based queue index.
    Goto(usize),
    Open(String),
    Flag(Variability),
    Select { method: MethodTag, slot: usize },
    Period(Option<f64>),
    Epoch(Option<f64>),
    VarTags(String),
    ObjectTags(String),
    Comment(String),
    Save,
    Panels,
    Status,
    Queue,
    Help,
    Quit,
}

fn optional_number(verb: &str, value: &str) -> Result<Option<f64>, String> {
    match value {
        "" => Err(format!("{verb} needs a value or '-'")),
        "-" | "none" => Ok(None),
        text => text
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| format!("'{text}' is not a number")),
    }
}

fn required<'a>(verb: &str, value: &'a str, what: &str) -> Result<&'a str, String> {
    if value.is_empty() {
        Err(format!("{verb} needs {what}"))
    } else {
        Ok(value)
    }
}

impl FromStr for ReviewCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(verb, rest)| (verb, rest.trim()));

        match verb.to_ascii_lowercase().as_str() {
            "next" | "n" => Ok(Self::Next),
            "prev" | "previous" | "p" => Ok(Self::Previous),
            "goto" | "g" => {
                let position = required(verb, rest, "a queue position")?
                    .parse::<usize>()
                    .ok()
                    .filter(|n| *n >= 1)
                    .ok_or_else(|| format!("'{rest}' is not a queue position (1, 2, ...)"))?;
                Ok(Self::Goto(position - 1))
            }
            "open" | "o" => Ok(Self::Open(
                required(verb, rest, "an identifier")?.to_string(),
            )),
            "flag" | "f" => required(verb, rest, "yes, no or ?")?
                .parse::<Variability>()
                .map(Self::Flag)
                .map_err(|e| e.to_string()),
            "select" | "sel" => {
                let mut parts = rest.split_whitespace();
                let (Some(method), Some(slot), None) = (parts.next(), parts.next(), parts.next())
                else {
                    return Err("usage: select <method> <slot>".to_string());
                };
                let method = method.parse::<MethodTag>().map_err(|e| e.to_string())?;
                let slot = slot
                    .parse::<usize>()
                    .map_err(|_| format!("'{slot}' is not a candidate slot"))?;
                Ok(Self::Select { method, slot })
            }
            "period" => optional_number(verb, rest).map(Self::Period),
            "epoch" => optional_number(verb, rest).map(Self::Epoch),
            "vartags" => Ok(Self::VarTags(rest.to_string())),
            "tags" | "objecttags" => Ok(Self::ObjectTags(rest.to_string())),
            "comment" | "comments" | "c" => Ok(Self::Comment(rest.to_string())),
            "save" | "s" => Ok(Self::Save),
            "panels" => Ok(Self::Panels),
            "status" | "st" => Ok(Self::Status),
            "queue" | "ls" => Ok(Self::Queue),
            "help" | "?" | "h" => Ok(Self::Help),
            "quit" | "q" | "exit" => Ok(Self::Quit),
            other => Err(format!("unknown command '{other}' (try 'help')")),
        }
    }
}
