//! Console commands accepted by an interactive session.

use std::path::PathBuf;
use std::str::FromStr;

use clinic_queue_core::{PatientId, ReportFormat};

use crate::theme::ThemeChoice;

/// One parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Show,
    Admit,
    Discharge,
    Advance { seconds: u64 },
    Edit { id: PatientId },
    Delete { id: PatientId },
    Export { format: ReportFormat, dir: PathBuf },
    Theme(ThemeChoice),
    Help,
    Quit,
}

pub const HELP: &str = "\
Comandos:
  show                      mostra a fila
  admit                     simula uma chegada
  discharge                 simula uma saída
  advance <segundos>        avança o relógio e dispara os timers vencidos
  edit <id>                 edita um paciente (Enter mantém, '-' limpa)
  delete <id>               remove um paciente (pede confirmação)
  export <csv|json> [dir]   grava o relatório de pacientes
  theme [dark|light|toggle] mostra ou altera o tema
  help                      esta ajuda
  quit                      sai";

/// Why a console line was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("comando vazio")]
    Empty,
    #[error("comando desconhecido: {0}")]
    Unknown(String),
    #[error("argumento ausente: {0}")]
    MissingArgument(&'static str),
    #[error("argumento inválido para {what}: {value}")]
    InvalidArgument { what: &'static str, value: String },
}

impl FromStr for SessionCommand {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let Some(verb) = parts.next() else {
            return Err(CommandError::Empty);
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "show" | "ls" => SessionCommand::Show,
            "admit" => SessionCommand::Admit,
            "discharge" => SessionCommand::Discharge,
            "advance" => SessionCommand::Advance {
                seconds: parse_arg(parts.next(), "segundos")?,
            },
            "edit" => SessionCommand::Edit {
                id: PatientId(parse_arg(parts.next(), "id")?),
            },
            "delete" | "rm" => SessionCommand::Delete {
                id: PatientId(parse_arg(parts.next(), "id")?),
            },
            "export" => {
                let format = match parts.next() {
                    None => return Err(CommandError::MissingArgument("formato")),
                    Some(raw) => match raw.to_ascii_lowercase().as_str() {
                        "csv" => ReportFormat::Csv,
                        "json" => ReportFormat::Json,
                        _ => {
                            return Err(CommandError::InvalidArgument {
                                what: "formato",
                                value: raw.to_string(),
                            })
                        }
                    },
                };
                let dir = parts.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
                SessionCommand::Export { format, dir }
            }
            "theme" => match parts.next() {
                None => SessionCommand::Theme(ThemeChoice::Show),
                Some(raw) => SessionCommand::Theme(raw.parse().map_err(|_| {
                    CommandError::InvalidArgument {
                        what: "tema",
                        value: raw.to_string(),
                    }
                })?),
            },
            "help" | "?" => SessionCommand::Help,
            "quit" | "exit" | "q" => SessionCommand::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

fn parse_arg<T: FromStr>(raw: Option<&str>, what: &'static str) -> Result<T, CommandError> {
    let raw = raw.ok_or(CommandError::MissingArgument(what))?;
    raw.parse().map_err(|_| CommandError::InvalidArgument {
        what,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::Theme;

    fn parse(line: &str) -> Result<SessionCommand, CommandError> {
        line.parse()
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse("show"), Ok(SessionCommand::Show));
        assert_eq!(parse("  ADMIT "), Ok(SessionCommand::Admit));
        assert_eq!(parse("q"), Ok(SessionCommand::Quit));
    }

    #[test]
    fn test_parse_id_commands() {
        assert_eq!(
            parse("edit 4"),
            Ok(SessionCommand::Edit { id: PatientId(4) })
        );
        assert_eq!(
            parse("delete 12"),
            Ok(SessionCommand::Delete { id: PatientId(12) })
        );
        assert_eq!(
            parse("edit"),
            Err(CommandError::MissingArgument("id"))
        );
        assert!(matches!(
            parse("delete abc"),
            Err(CommandError::InvalidArgument { what: "id", .. })
        ));
    }

    #[test]
    fn test_parse_advance() {
        assert_eq!(
            parse("advance 30"),
            Ok(SessionCommand::Advance { seconds: 30 })
        );
    }

    #[test]
    fn test_parse_export() {
        assert_eq!(
            parse("export csv"),
            Ok(SessionCommand::Export {
                format: ReportFormat::Csv,
                dir: PathBuf::from("."),
            })
        );
        assert_eq!(
            parse("export JSON /tmp/out"),
            Ok(SessionCommand::Export {
                format: ReportFormat::Json,
                dir: PathBuf::from("/tmp/out"),
            })
        );
        assert!(parse("export pdf").is_err());
    }

    #[test]
    fn test_parse_theme() {
        assert_eq!(parse("theme"), Ok(SessionCommand::Theme(ThemeChoice::Show)));
        assert_eq!(
            parse("theme dark"),
            Ok(SessionCommand::Theme(ThemeChoice::Set(Theme::Dark)))
        );
        assert_eq!(
            parse("theme toggle"),
            Ok(SessionCommand::Theme(ThemeChoice::Toggle))
        );
    }

    #[test]
    fn test_unknown_and_empty() {
        assert_eq!(parse(""), Err(CommandError::Empty));
        assert_eq!(
            parse("dance"),
            Err(CommandError::Unknown("dance".into()))
        );
    }
}
