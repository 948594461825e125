use crate::storage::entity::speaker::{AgeRange, Gender};
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;

/// Which of the two media-bearing record kinds a command targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Language,
    Geographic,
}

/// Arguments of a list command: `key=value` options plus free search words.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListArgs {
    pub search: Option<String>,
    pub options: HashMap<String, String>,
    /// Zero-based.
    pub page: u64,
}

impl ListArgs {
    fn parse(words: &[&str]) -> Self {
        let mut args = ListArgs::default();
        let mut search = Vec::new();
        for word in words {
            match word.split_once('=') {
                Some(("page", v)) => {
                    args.page = v.parse::<u64>().ok().map(|p| p.saturating_sub(1)).unwrap_or(0);
                }
                Some((k, v)) if !k.is_empty() => {
                    args.options.insert(k.to_ascii_lowercase(), v.to_string());
                }
                _ => search.push(*word),
            }
        }
        if !search.is_empty() {
            args.search = Some(search.join(" "));
        }
        args
    }

    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Villages(ListArgs),
    VillageAdd {
        name: String,
        latitude: f64,
        longitude: f64,
        description: Option<String>,
    },
    /// `description: None` keeps the stored description.
    VillageEdit {
        id: i32,
        name: String,
        latitude: f64,
        longitude: f64,
        description: Option<String>,
    },
    VillageDelete {
        id: i32,
    },
    Speakers(ListArgs),
    SpeakerAdd {
        speaker_id: String,
        age_range: AgeRange,
        gender: Gender,
        village_id: Option<i32>,
        consent_video: bool,
        notes: Option<String>,
    },
    /// `notes: None` keeps the stored notes.
    SpeakerEdit {
        id: i32,
        speaker_id: String,
        age_range: AgeRange,
        gender: Gender,
        village_id: Option<i32>,
        consent_video: bool,
        notes: Option<String>,
    },
    SpeakerDelete {
        id: i32,
    },
    Types(ListArgs),
    TypeAdd {
        type_code: String,
        type_name: String,
        description: Option<String>,
    },
    TypeEdit {
        id: i32,
        type_code: String,
        type_name: String,
        description: Option<String>,
    },
    TypeDelete {
        id: i32,
    },
    Records(RecordKind, ListArgs),
    RecordShow {
        kind: RecordKind,
        id: i32,
    },
    RecordSubmit {
        kind: RecordKind,
        form: PathBuf,
        media: Option<PathBuf>,
        thumbnail: Option<PathBuf>,
    },
    RecordEdit {
        kind: RecordKind,
        id: i32,
        form: PathBuf,
        media: Option<PathBuf>,
        thumbnail: Option<PathBuf>,
    },
    RecordDelete {
        kind: RecordKind,
        id: i32,
    },
    Form {
        is_new: bool,
    },
    Help,
    Quit,
    Unknown(String),
}

pub const USAGE: &[&str] = &[
    "villages [page=N] [search]",
    "village add <lat> <lon> <name...> [-- <description...>]",
    "village edit <id> <lat> <lon> <name...> [-- <description...>] | village delete <id>",
    "speakers [gender=M|F|O] [consent=yes|no] [village=<id>] [page=N] [search]",
    "speaker add <speaker_id> <age_range> <gender> [village=<id>] [consent=yes] [-- <notes...>]",
    "speaker edit <id> <speaker_id> <age_range> <gender> [village=<id>] [consent=yes] [-- <notes...>] | speaker delete <id>",
    "types [page=N] [search] | type add <code> <name...> -- <description...>",
    "type edit <id> <code> <name...> [-- <description...>] | type delete <id>",
    "records [file_type=..] [village=<id>] [from=YYYY-MM-DD] [to=YYYY-MM-DD] [type=<type id>] [freq=..] [page=N] [search]",
    "record show|delete <id> | record submit <form.json> [media] [thumb=<path>] | record edit <id> <form.json> [media] [thumb=<path>]",
    "geo [content=..] [village=<id>] [from=..] [to=..] [page=N] [search]",
    "geo show|delete <id> | geo submit <form.json> [media] [thumb=<path>] | geo edit <id> <form.json> [media] [thumb=<path>]",
    "form new|edit",
    "help | quit",
];

impl FromStr for AppCommand {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        if parts.is_empty() {
            return Ok(AppCommand::Unknown("".to_string()));
        }

        match parts[0] {
            "villages" => Ok(AppCommand::Villages(ListArgs::parse(&parts[1..]))),
            "village" => match parts.get(1).copied() {
                Some("add") => {
                    let (args, description) = split_text(&parts[2..]);
                    match parse_village(args) {
                        Some((name, latitude, longitude)) => Ok(AppCommand::VillageAdd {
                            name,
                            latitude,
                            longitude,
                            description,
                        }),
                        None => Ok(usage("village add <lat> <lon> <name...> [-- <description...>]")),
                    }
                }
                Some("edit") => {
                    let id = parse_id(parts.get(2));
                    let (args, description) = split_text(parts.get(3..).unwrap_or_default());
                    match (id, parse_village(args)) {
                        (Some(id), Some((name, latitude, longitude))) => {
                            Ok(AppCommand::VillageEdit {
                                id,
                                name,
                                latitude,
                                longitude,
                                description,
                            })
                        }
                        _ => Ok(usage(
                            "village edit <id> <lat> <lon> <name...> [-- <description...>]",
                        )),
                    }
                }
                Some("delete") => match parse_id(parts.get(2)) {
                    Some(id) => Ok(AppCommand::VillageDelete { id }),
                    None => Ok(usage("village delete <id>")),
                },
                _ => Ok(usage("village add|edit|delete ...")),
            },
            "speakers" => Ok(AppCommand::Speakers(ListArgs::parse(&parts[1..]))),
            "speaker" => match parts.get(1).copied() {
                Some("add") => parse_speaker(None, &parts[2..]),
                Some("edit") => match parse_id(parts.get(2)) {
                    Some(id) => parse_speaker(Some(id), &parts[3..]),
                    None => Ok(usage("speaker edit <id> <speaker_id> <age_range> <gender> ...")),
                },
                Some("delete") => match parse_id(parts.get(2)) {
                    Some(id) => Ok(AppCommand::SpeakerDelete { id }),
                    None => Ok(usage("speaker delete <id>")),
                },
                _ => Ok(usage("speaker add|edit|delete ...")),
            },
            "types" => Ok(AppCommand::Types(ListArgs::parse(&parts[1..]))),
            "type" => match parts.get(1).copied() {
                Some("add") => match parse_type(&parts[2..]) {
                    Some((type_code, type_name, description)) => Ok(AppCommand::TypeAdd {
                        type_code,
                        type_name,
                        description,
                    }),
                    None => Ok(usage("type add <code> <name...> -- <description...>")),
                },
                Some("edit") => {
                    let id = parse_id(parts.get(2));
                    match (id, parse_type(parts.get(3..).unwrap_or_default())) {
                        (Some(id), Some((type_code, type_name, description))) => {
                            Ok(AppCommand::TypeEdit {
                                id,
                                type_code,
                                type_name,
                                description,
                            })
                        }
                        _ => Ok(usage("type edit <id> <code> <name...> [-- <description...>]")),
                    }
                }
                Some("delete") => match parse_id(parts.get(2)) {
                    Some(id) => Ok(AppCommand::TypeDelete { id }),
                    None => Ok(usage("type delete <id>")),
                },
                _ => Ok(usage("type add|edit|delete ...")),
            },
            "records" => Ok(AppCommand::Records(
                RecordKind::Language,
                ListArgs::parse(&parts[1..]),
            )),
            "record" => parse_record(RecordKind::Language, "record", &parts[1..]),
            "geo" => match parts.get(1).copied() {
                Some("show" | "submit" | "edit" | "delete") => {
                    parse_record(RecordKind::Geographic, "geo", &parts[1..])
                }
                _ => Ok(AppCommand::Records(
                    RecordKind::Geographic,
                    ListArgs::parse(&parts[1..]),
                )),
            },
            "form" => match parts.get(1).copied() {
                Some("new") => Ok(AppCommand::Form { is_new: true }),
                Some("edit") => Ok(AppCommand::Form { is_new: false }),
                _ => Ok(usage("form new|edit")),
            },
            "help" | "h" => Ok(AppCommand::Help),
            "quit" | "q" | "exit" => Ok(AppCommand::Quit),
            _ => Ok(AppCommand::Unknown(format!("unknown command: {}", parts[0]))),
        }
    }
}

fn usage(text: &str) -> AppCommand {
    AppCommand::Unknown(format!("usage: {}", text))
}

fn parse_id(token: Option<&&str>) -> Option<i32> {
    token.and_then(|s| s.parse::<i32>().ok())
}

/// Splits off the free text after a `--` token. The text keeps its words
/// joined by single spaces; `--` with nothing after it gives an empty string.
fn split_text<'a, 'b>(args: &'a [&'b str]) -> (&'a [&'b str], Option<String>) {
    match args.iter().position(|w| *w == "--") {
        Some(i) => (&args[..i], Some(args[i + 1..].join(" "))),
        None => (args, None),
    }
}

/// `<code> <name...> [-- <description...>]`
fn parse_type(args: &[&str]) -> Option<(String, String, Option<String>)> {
    let (args, description) = split_text(args);
    let code = args.first()?.to_string();
    let name = args.get(1..).map(|w| w.join(" ")).unwrap_or_default();
    if name.is_empty() {
        return None;
    }
    Some((code, name, description))
}

/// `<lat> <lon> <name...>`
fn parse_village(args: &[&str]) -> Option<(String, f64, f64)> {
    let lat = args.first().and_then(|s| s.parse::<f64>().ok())?;
    let lon = args.get(1).and_then(|s| s.parse::<f64>().ok())?;
    let name = args.get(2..).map(|w| w.join(" ")).unwrap_or_default();
    if name.is_empty() {
        return None;
    }
    Some((name, lat, lon))
}

/// Shared by `speaker add` (no id) and `speaker edit <id>`.
fn parse_speaker(id: Option<i32>, args: &[&str]) -> Result<AppCommand, ()> {
    const SPEAKER_USAGE: &str =
        "speaker add|edit [<id>] <speaker_id> <age_range> <gender> [village=<id>] [consent=yes] [-- <notes...>]";
    let (args, notes) = split_text(args);
    let (Some(code), Some(age), Some(gender)) = (args.first(), args.get(1), args.get(2)) else {
        return Ok(usage(SPEAKER_USAGE));
    };
    let age_range = match age.parse::<AgeRange>() {
        Ok(a) => a,
        Err(e) => return Ok(AppCommand::Unknown(e.to_string())),
    };
    let gender = match gender.parse::<Gender>() {
        Ok(g) => g,
        Err(e) => return Ok(AppCommand::Unknown(e.to_string())),
    };
    let opts = ListArgs::parse(&args[3..]);
    let village_id = match opts.option("village") {
        Some(v) => match v.parse::<i32>() {
            Ok(id) => Some(id),
            Err(_) => return Ok(usage(SPEAKER_USAGE)),
        },
        None => None,
    };
    let consent_video = opts.option("consent").map(is_truthy).unwrap_or(false);
    let speaker_id = code.to_string();
    Ok(match id {
        None => AppCommand::SpeakerAdd {
            speaker_id,
            age_range,
            gender,
            village_id,
            consent_video,
            notes,
        },
        Some(id) => AppCommand::SpeakerEdit {
            id,
            speaker_id,
            age_range,
            gender,
            village_id,
            consent_video,
            notes,
        },
    })
}

fn parse_record(kind: RecordKind, noun: &str, args: &[&str]) -> Result<AppCommand, ()> {
    match args.first().copied() {
        Some("show") => match parse_id(args.get(1)) {
            Some(id) => Ok(AppCommand::RecordShow { kind, id }),
            None => Ok(usage(&format!("{} show <id>", noun))),
        },
        Some("delete") => match parse_id(args.get(1)) {
            Some(id) => Ok(AppCommand::RecordDelete { kind, id }),
            None => Ok(usage(&format!("{} delete <id>", noun))),
        },
        Some("submit") => {
            let (paths, thumbnail) = split_files(&args[1..]);
            match paths.first() {
                Some(form) => Ok(AppCommand::RecordSubmit {
                    kind,
                    form: form.clone(),
                    media: paths.get(1).cloned(),
                    thumbnail,
                }),
                None => Ok(usage(&format!(
                    "{} submit <form.json> [media] [thumb=<path>]",
                    noun
                ))),
            }
        }
        Some("edit") => {
            let id = parse_id(args.get(1));
            let (paths, thumbnail) = split_files(args.get(2..).unwrap_or_default());
            match (id, paths.first()) {
                (Some(id), Some(form)) => Ok(AppCommand::RecordEdit {
                    kind,
                    id,
                    form: form.clone(),
                    media: paths.get(1).cloned(),
                    thumbnail,
                }),
                _ => Ok(usage(&format!(
                    "{} edit <id> <form.json> [media] [thumb=<path>]",
                    noun
                ))),
            }
        }
        _ => Ok(usage(&format!("{} show|submit|edit|delete ...", noun))),
    }
}

fn split_files(args: &[&str]) -> (Vec<PathBuf>, Option<PathBuf>) {
    let mut paths = Vec::new();
    let mut thumbnail = None;
    for arg in args {
        match arg.strip_prefix("thumb=") {
            Some(p) if !p.is_empty() => thumbnail = Some(PathBuf::from(p)),
            Some(_) => {}
            None => paths.push(PathBuf::from(arg)),
        }
    }
    (paths, thumbnail)
}

pub(crate) fn is_truthy(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> AppCommand {
        s.parse().unwrap()
    }

    #[test]
    fn parses_list_options_and_search() {
        let AppCommand::Records(RecordKind::Language, args) =
            parse("records file_type=audio page=2 heavy rain")
        else {
            panic!("expected records command");
        };
        assert_eq!(args.search.as_deref(), Some("heavy rain"));
        assert_eq!(args.option("file_type"), Some("audio"));
        assert_eq!(args.page, 1);
    }

    #[test]
    fn geo_without_subcommand_lists() {
        assert!(matches!(
            parse("geo content=drone_video"),
            AppCommand::Records(RecordKind::Geographic, _)
        ));
        assert_eq!(
            parse("geo show 4"),
            AppCommand::RecordShow {
                kind: RecordKind::Geographic,
                id: 4
            }
        );
    }

    #[test]
    fn parses_speaker_add() {
        assert_eq!(
            parse("speaker add SPK001 70-79 F village=2 consent=yes"),
            AppCommand::SpeakerAdd {
                speaker_id: "SPK001".to_string(),
                age_range: AgeRange::Seventies,
                gender: Gender::Female,
                village_id: Some(2),
                consent_video: true,
                notes: None,
            }
        );
        assert!(matches!(
            parse("speaker add SPK001 20-29 F"),
            AppCommand::Unknown(_)
        ));
        assert_eq!(
            parse("speaker edit 5 SPK002 100+ O"),
            AppCommand::SpeakerEdit {
                id: 5,
                speaker_id: "SPK002".to_string(),
                age_range: AgeRange::Centenarian,
                gender: Gender::Other,
                village_id: None,
                consent_video: false,
                notes: None,
            }
        );
    }

    #[test]
    fn parses_record_submit_with_media() {
        assert_eq!(
            parse("record submit form.json clip.mp4 thumb=still.jpg"),
            AppCommand::RecordSubmit {
                kind: RecordKind::Language,
                form: PathBuf::from("form.json"),
                media: Some(PathBuf::from("clip.mp4")),
                thumbnail: Some(PathBuf::from("still.jpg")),
            }
        );
        assert_eq!(
            parse("record edit 3 form.json"),
            AppCommand::RecordEdit {
                kind: RecordKind::Language,
                id: 3,
                form: PathBuf::from("form.json"),
                media: None,
                thumbnail: None,
            }
        );
    }

    #[test]
    fn parses_village_add_with_spaced_name() {
        assert_eq!(
            parse("village add 26.5 127.9 Upper Ridge"),
            AppCommand::VillageAdd {
                name: "Upper Ridge".to_string(),
                latitude: 26.5,
                longitude: 127.9,
                description: None,
            }
        );
        assert!(matches!(parse("village add north"), AppCommand::Unknown(_)));
        assert_eq!(
            parse("village edit 3 26.5 127.9 Lower Ridge"),
            AppCommand::VillageEdit {
                id: 3,
                name: "Lower Ridge".to_string(),
                latitude: 26.5,
                longitude: 127.9,
                description: None,
            }
        );
    }

    #[test]
    fn unknown_and_control_commands() {
        assert_eq!(parse("q"), AppCommand::Quit);
        assert_eq!(parse("help"), AppCommand::Help);
        assert_eq!(parse("form new"), AppCommand::Form { is_new: true });
        assert!(matches!(parse("frobnicate"), AppCommand::Unknown(_)));
    }

    #[test]
    fn free_text_follows_double_dash() {
        assert_eq!(
            parse("village add 26.5 127.9 Upper Ridge -- Terraced  fields above the bay"),
            AppCommand::VillageAdd {
                name: "Upper Ridge".to_string(),
                latitude: 26.5,
                longitude: 127.9,
                description: Some("Terraced fields above the bay".to_string()),
            }
        );
        assert_eq!(
            parse("speaker edit 2 SPK002 60-69 M consent=no --"),
            AppCommand::SpeakerEdit {
                id: 2,
                speaker_id: "SPK002".to_string(),
                age_range: AgeRange::Sixties,
                gender: Gender::Male,
                village_id: None,
                consent_video: false,
                notes: Some(String::new()),
            }
        );
        match parse("speaker add SPK003 90-99 F village=1 -- hard of hearing") {
            AppCommand::SpeakerAdd {
                village_id, notes, ..
            } => {
                assert_eq!(village_id, Some(1));
                assert_eq!(notes.as_deref(), Some("hard of hearing"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn parses_type_add_and_edit() {
        assert_eq!(
            parse("type add ABAB reduplicated form -- Two-mora root repeated"),
            AppCommand::TypeAdd {
                type_code: "ABAB".to_string(),
                type_name: "reduplicated form".to_string(),
                description: Some("Two-mora root repeated".to_string()),
            }
        );
        assert_eq!(
            parse("type edit 4 ABCABC tripled"),
            AppCommand::TypeEdit {
                id: 4,
                type_code: "ABCABC".to_string(),
                type_name: "tripled".to_string(),
                description: None,
            }
        );
        assert!(matches!(parse("type edit ABAB x"), AppCommand::Unknown(_)));
        assert!(matches!(parse("type add ABAB -- text"), AppCommand::Unknown(_)));
    }
}
