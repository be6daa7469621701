//! The `cgpa session` command: a line-oriented data-entry loop.
//!
//! Each session gets its own store; nothing entered here is written to disk.

use std::collections::BTreeMap;
use std::io::{BufRead, Write};

use anyhow::{anyhow, bail, Context, Result};

use cgpa_core::catalog::{CatalogStore, SharedCatalog};
use cgpa_core::grade::Grade;
use cgpa_core::model::Semester;
use cgpa_core::report::format_average;
use cgpa_core::session::Session;

use super::{subject_table, summary_table, GlobalArgs};

const HELP: &str = "\
Commands:
  grade <sem> CODE=G [CODE=G ...]   calculate a semester from its own subjects
  arrear <sem> CODE G               count a cleared subject toward semester <sem>
  drop CODE                         stop counting an arrear
  subjects <sem>                    list a semester's subjects
  show                              per-semester GPAs, CGPA and arrears
  reset                             forget everything entered so far
  help                              this text
  quit                              leave the session
Grades: S A B C D E F";

/// A parsed input line.
#[derive(Debug, PartialEq)]
enum Command {
    Grade {
        semester: Semester,
        grades: BTreeMap<String, String>,
    },
    Arrear {
        semester: Semester,
        code: String,
        grade: String,
    },
    Drop(String),
    Subjects(Semester),
    Show,
    Reset,
    Help,
    Quit,
}

fn parse_semester(token: Option<&str>) -> Result<Semester> {
    let token = token.ok_or_else(|| anyhow!("missing semester number"))?;
    let n: u32 = token
        .parse()
        .with_context(|| format!("'{token}' is not a semester number"))?;
    Ok(Semester::try_from(n)?)
}

fn parse_line(line: &str) -> Result<Option<Command>> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };

    let command = match verb.to_lowercase().as_str() {
        "grade" => {
            let semester = parse_semester(words.next())?;
            let mut grades = BTreeMap::new();
            for pair in words {
                let (code, grade) = pair
                    .split_once('=')
                    .ok_or_else(|| anyhow!("expected CODE=GRADE, got '{pair}'"))?;
                grades.insert(code.to_string(), grade.to_uppercase());
            }
            Command::Grade { semester, grades }
        }
        "arrear" => {
            let semester = parse_semester(words.next())?;
            let code = words.next().ok_or_else(|| anyhow!("missing subject code"))?;
            let grade = words.next().ok_or_else(|| anyhow!("missing grade"))?;
            Command::Arrear {
                semester,
                code: code.to_string(),
                grade: grade.to_uppercase(),
            }
        }
        "drop" => {
            let code = words.next().ok_or_else(|| anyhow!("missing subject code"))?;
            Command::Drop(code.to_string())
        }
        "subjects" => Command::Subjects(parse_semester(words.next())?),
        "show" => Command::Show,
        "reset" => Command::Reset,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => bail!("unknown command '{other}' (try 'help')"),
    };
    Ok(Some(command))
}

/// Apply one command. Returns `false` when the session should end.
fn dispatch(session: &mut Session, command: Command, out: &mut impl Write) -> Result<bool> {
    match command {
        Command::Grade { semester, grades } => {
            for grade in grades.values() {
                if grade.parse::<Grade>().is_err() {
                    writeln!(out, "note: '{grade}' is not a known grade, counted as 0 points")?;
                }
            }
            let calc = session.calculate_semester(semester, &grades);
            writeln!(
                out,
                "{semester} GPA = {} (numerator {}, credits {})",
                format_average(calc.report.average),
                calc.report.numerator,
                calc.report.total_credits
            )?;
            if !calc.defaulted.is_empty() {
                writeln!(out, "note: no grade for {}, counted as F", calc.defaulted.join(", "))?;
            }
            if !calc.ignored.is_empty() {
                writeln!(out, "note: not in {semester}, ignored: {}", calc.ignored.join(", "))?;
            }
        }
        Command::Arrear {
            semester,
            code,
            grade,
        } => {
            let replaced = session.mark_arrear(semester, &code, &grade)?;
            let verb = if replaced.is_some() { "updated" } else { "recorded" };
            writeln!(out, "Arrear {code} {verb}: grade {grade}, counts toward {semester}")?;
            writeln!(
                out,
                "{semester} GPA = {}",
                format_average(session.store().semester_average(semester).average)
            )?;
        }
        Command::Drop(code) => match session.clear_arrear(&code) {
            Some(_) => writeln!(out, "Arrear {code} removed")?,
            None => writeln!(out, "No arrear recorded for {code}")?,
        },
        Command::Subjects(semester) => {
            let subjects = session.catalog().subjects(semester);
            if subjects.is_empty() {
                writeln!(out, "{semester}: no subjects defined")?;
            } else {
                writeln!(out, "{}", subject_table(subjects))?;
            }
        }
        Command::Show => {
            let summary = session.summary();
            writeln!(out, "{}", summary_table(&summary))?;
            writeln!(out, "CGPA = {}", format_average(summary.cumulative.average))?;
        }
        Command::Reset => {
            session.reset();
            writeln!(out, "Session reset.")?;
        }
        Command::Help => writeln!(out, "{HELP}")?,
        Command::Quit => return Ok(false),
    }
    Ok(true)
}

/// Drive a session from `input` until EOF or `quit`.
fn run_loop(session: &mut Session, input: impl BufRead, out: &mut impl Write) -> Result<()> {
    for line in input.lines() {
        let line = line.context("failed to read input")?;
        let keep_going = match parse_line(&line) {
            Ok(Some(command)) => dispatch(session, command, out),
            Ok(None) => Ok(true),
            Err(e) => Err(e),
        };
        match keep_going {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => writeln!(out, "error: {e:#}")?,
        }
        out.flush()?;
    }
    Ok(())
}

pub fn execute(ctx: &GlobalArgs) -> Result<()> {
    let store = ctx.catalog_store()?;
    let shared = SharedCatalog::new(store.load()?);
    let mut session = Session::new(shared.snapshot());

    println!(
        "cgpa session {} ({} subjects). Type 'help' for commands.",
        session.id(),
        session.catalog().subject_count()
    );

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    run_loop(&mut session, stdin.lock(), &mut stdout)?;

    let cgpa = format_average(session.summary().cumulative.average);
    println!("Final CGPA = {cgpa}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use cgpa_core::catalog::Catalog;

    use super::*;

    fn sem(n: u32) -> Semester {
        Semester::try_from(n).unwrap()
    }

    fn run(script: &str) -> String {
        let mut session = Session::new(Arc::new(Catalog::default_curriculum()));
        let mut out = Vec::new();
        run_loop(&mut session, script.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn parse_grade_line() {
        let cmd = parse_line("grade 1 MA201=a ME202=S").unwrap().unwrap();
        let Command::Grade { semester, grades } = cmd else {
            panic!("expected grade command");
        };
        assert_eq!(semester, sem(1));
        assert_eq!(grades.get("MA201").map(String::as_str), Some("A"));
        assert_eq!(grades.len(), 2);
    }

    #[test]
    fn parse_other_lines() {
        assert_eq!(parse_line("   ").unwrap(), None);
        assert_eq!(parse_line("show").unwrap(), Some(Command::Show));
        assert_eq!(parse_line("QUIT").unwrap(), Some(Command::Quit));
        assert_eq!(
            parse_line("drop CS204").unwrap(),
            Some(Command::Drop("CS204".into()))
        );
        assert_eq!(
            parse_line("arrear 2 PH201 b").unwrap(),
            Some(Command::Arrear {
                semester: sem(2),
                code: "PH201".into(),
                grade: "B".into(),
            })
        );
    }

    #[test]
    fn parse_errors() {
        assert!(parse_line("grade").is_err());
        assert!(parse_line("grade 9 MA201=A").is_err());
        assert!(parse_line("grade one MA201=A").is_err());
        assert!(parse_line("grade 1 MA201").is_err());
        assert!(parse_line("arrear 1 MA201").is_err());
        assert!(parse_line("frobnicate").is_err());
    }

    #[test]
    fn loop_reports_errors_and_continues() {
        let out = run("frobnicate\nshow\n");
        assert!(out.contains("error: unknown command 'frobnicate'"));
        assert!(out.contains("CGPA = -"));
    }

    #[test]
    fn loop_stops_at_quit() {
        let out = run("quit\nshow\n");
        assert!(out.is_empty());
    }

    #[test]
    fn loop_grades_and_arrears() {
        let out = run(
            "grade 1 MA201=A ME202=S EE201=A EE202=A CS201=A CS202=A\n\
             arrear 1 CS204 B\n\
             arrear 1 CS204 S\n\
             drop CS204\n\
             drop CS204\n",
        );
        assert!(out.contains("Semester 1 GPA = 9.176"));
        assert!(out.contains("Arrear CS204 recorded: grade B"));
        assert!(out.contains("Arrear CS204 updated: grade S"));
        assert!(out.contains("Arrear CS204 removed"));
        assert!(out.contains("No arrear recorded for CS204"));
    }

    #[test]
    fn loop_flags_unknown_grade() {
        let out = run("grade 1 MA201=Q\n");
        assert!(out.contains("'Q' is not a known grade"));
        assert!(out.contains("no grade for"));
    }
}
