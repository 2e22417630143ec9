//! Interactive command parsing.

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Status,
    /// Without a day id: the plan overview.
    Plan(Option<String>),
    /// `n` is 1-based, as shown by `plan <day>`.
    Check { day_id: String, n: usize, checked: bool },
    Done(String),
    Diary { pain: u8, stress: u8, sleep: u8 },
    History,
    Sense(String),
    Reset,
    Help,
    Quit,
    Chat(String),
    Empty,
    /// A known command with bad arguments; carries the usage line.
    Usage(&'static str),
}

pub const HELP: &str = "\
Comandos:
  status                          nivel, XP, racha y logros
  plan [día]                      plan completo o ejercicios de un día (daily, warmup, day1-3)
  check <día> <n> / uncheck ...   marcar o desmarcar el ejercicio n
  done <día>                      completar un entrenamiento
  diary <dolor> <estrés> <sueño>  diario de hoy (0-10, 0-10, 1=mala 2=regular 3=buena)
  history                         historial de dolor
  sense <descripción>             analizar una sensación
  reset                           borrar todo el progreso
  help / quit
Cualquier otro texto se envía al coach.";

pub fn parse(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }

    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((h, r)) => (h, r.trim()),
        None => (line, ""),
    };
    let args: Vec<&str> = rest.split_whitespace().collect();

    match head.to_lowercase().as_str() {
        "status" => Command::Status,
        "plan" => Command::Plan(args.first().map(|s| s.to_string())),
        "check" | "uncheck" => {
            let checked = head.eq_ignore_ascii_case("check");
            match args.as_slice() {
                [day_id, n] => match n.parse::<usize>() {
                    Ok(n) if n >= 1 => Command::Check {
                        day_id: day_id.to_string(),
                        n,
                        checked,
                    },
                    _ => Command::Usage("check <día> <n>  (n empieza en 1)"),
                },
                _ => Command::Usage("check <día> <n>"),
            }
        }
        "done" => match args.as_slice() {
            [day_id] => Command::Done(day_id.to_string()),
            _ => Command::Usage("done <día>"),
        },
        "diary" => match args.as_slice() {
            [p, s, q] => match (p.parse(), s.parse(), q.parse()) {
                (Ok(pain), Ok(stress), Ok(sleep)) => Command::Diary { pain, stress, sleep },
                _ => Command::Usage("diary <dolor 0-10> <estrés 0-10> <sueño 1-3>"),
            },
            _ => Command::Usage("diary <dolor 0-10> <estrés 0-10> <sueño 1-3>"),
        },
        "history" => Command::History,
        "sense" if rest.is_empty() => Command::Usage("sense <descripción>"),
        "sense" => Command::Sense(rest.to_string()),
        "reset" => Command::Reset,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => Command::Chat(line.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_commands() {
        assert_eq!(parse("  status "), Command::Status);
        assert_eq!(parse("QUIT"), Command::Quit);
        assert_eq!(parse(""), Command::Empty);
        assert_eq!(parse("plan"), Command::Plan(None));
        assert_eq!(parse("plan day2"), Command::Plan(Some("day2".into())));
    }

    #[test]
    fn test_check_and_uncheck() {
        assert_eq!(
            parse("check day1 3"),
            Command::Check {
                day_id: "day1".into(),
                n: 3,
                checked: true
            }
        );
        assert_eq!(
            parse("uncheck daily 1"),
            Command::Check {
                day_id: "daily".into(),
                n: 1,
                checked: false
            }
        );
        assert!(matches!(parse("check day1 0"), Command::Usage(_)));
        assert!(matches!(parse("check day1"), Command::Usage(_)));
    }

    #[test]
    fn test_diary_arguments() {
        assert_eq!(
            parse("diary 3 4 2"),
            Command::Diary {
                pain: 3,
                stress: 4,
                sleep: 2
            }
        );
        assert!(matches!(parse("diary 3 x 2"), Command::Usage(_)));
        assert!(matches!(parse("diary 300 1 2"), Command::Usage(_)));
    }

    #[test]
    fn test_sense_keeps_full_description() {
        assert_eq!(
            parse("sense pinchazo en la lumbar al bajar"),
            Command::Sense("pinchazo en la lumbar al bajar".into())
        );
        assert!(matches!(parse("sense"), Command::Usage(_)));
    }

    #[test]
    fn test_free_text_is_chat() {
        assert_eq!(
            parse("¿Puedo cambiar el peso muerto?"),
            Command::Chat("¿Puedo cambiar el peso muerto?".into())
        );
        assert_eq!(parse("donde empiezo"), Command::Chat("donde empiezo".into()));
    }
}
