//! Shell command grammar.

/// One parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Add,
    Open(usize),
    Delete(usize),
    Rename(String),
    DogAdd,
    DogRename(usize, String),
    DogRemove(Vec<usize>),
    DogMove(usize, usize),
    Back,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  list              show people
  add               add a person
  open N            open person N
  delete N          delete person N and their dogs
  name TEXT         rename the open person
  dog add           add a dog to the open person
  dog name I TEXT   rename dog I
  dog rm I [J ...]  remove dogs at offsets
  dog mv I J        move dog I to offset J
  back              return to the list
  help              show this text
  quit              exit";

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = split_word(line);

    let command = match word {
        "list" | "ls" => Command::List,
        "add" => Command::Add,
        "open" => Command::Open(index(rest)?),
        "delete" | "del" => Command::Delete(index(rest)?),
        "name" => Command::Rename(rest.to_string()),
        "back" => Command::Back,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        "dog" => parse_dog(rest)?,
        other => return Err(format!("unknown command `{other}`; try `help`")),
    };
    Ok(Some(command))
}

fn parse_dog(rest: &str) -> Result<Command, String> {
    let (word, rest) = split_word(rest);
    match word {
        "add" => Ok(Command::DogAdd),
        "name" => {
            let (offset, text) = split_word(rest);
            Ok(Command::DogRename(index(offset)?, text.to_string()))
        }
        "rm" => {
            let offsets = rest
                .split_whitespace()
                .map(index)
                .collect::<Result<Vec<_>, _>>()?;
            if offsets.is_empty() {
                return Err("dog rm needs at least one offset".to_string());
            }
            Ok(Command::DogRemove(offsets))
        }
        "mv" => {
            let (from, to) = split_word(rest);
            Ok(Command::DogMove(index(from)?, index(to)?))
        }
        other => Err(format!("unknown dog command `{other}`; try `help`")),
    }
}

fn split_word(value: &str) -> (&str, &str) {
    let value = value.trim_start();
    match value.find(char::is_whitespace) {
        Some(at) => (&value[..at], value[at..].trim_start()),
        None => (value, ""),
    }
}

fn index(value: &str) -> Result<usize, String> {
    let value = value.trim();
    value
        .parse::<usize>()
        .map_err(|_| format!("expected a row number, got `{value}`"))
}
