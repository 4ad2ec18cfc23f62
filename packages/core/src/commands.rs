//! Command boundary: tokenised dispatch, user-facing rendering, and the
//! interactive loop.
//!
//! Commands arrive as whitespace-separated tokens with fixed arity; each
//! maps to one coordinator call. Every [`SchedulerError`] is rendered as a
//! plain message line; no failure terminates the loop, only `quit` does.

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::coordinator::Coordinator;
use crate::error::{SchedulerError, SchedulerResult};
use crate::model::Role;
use crate::session::Session;

/// What one dispatched line produced.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Message(String),
    Quit,
}

/// Menu shown before each prompt. Commands can be typed by name or number.
pub fn help() -> String {
    [
        "commands (name or number, dates as yyyy-mm-dd):",
        "  (1)  create_patient <username> <password>",
        "  (2)  create_caregiver <username> <password>",
        "  (3)  login_patient <username> <password>",
        "  (4)  login_caregiver <username> <password>",
        "  (5)  search_caregiver_schedule <date>",
        "  (6)  reserve <date> <vaccine>",
        "  (7)  upload_availability <date>",
        "  (8)  cancel <appointment_id>",
        "  (9)  add_doses <vaccine> <number>",
        "  (10) show_appointments",
        "  (11) logout",
        "  (12) quit",
    ]
    .join("\n")
}

/// Run one command line against the coordinator, mutating `session` on
/// login, registration, and logout.
pub async fn dispatch(
    coordinator: &Coordinator,
    session: &mut Session,
    line: &str,
) -> Outcome {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.is_empty() {
        return Outcome::Message("please enter a command".into());
    }
    if matches!(tokens[0], "quit" | "12") {
        return Outcome::Quit;
    }

    match run(coordinator, session, &tokens).await {
        Ok(message) => Outcome::Message(message),
        Err(err) => Outcome::Message(err.to_string()),
    }
}

async fn run(
    coordinator: &Coordinator,
    session: &mut Session,
    tokens: &[&str],
) -> SchedulerResult<String> {
    match tokens[0] {
        "create_patient" | "1" => {
            expect_arity(tokens, 3)?;
            let next = coordinator
                .register(session, Role::Patient, tokens[1], tokens[2])
                .await?;
            *session = next;
            Ok(format!("account created, patient logged in as {}", tokens[1]))
        }
        "create_caregiver" | "2" => {
            expect_arity(tokens, 3)?;
            let next = coordinator
                .register(session, Role::Caregiver, tokens[1], tokens[2])
                .await?;
            *session = next;
            Ok(format!("account created, caregiver logged in as {}", tokens[1]))
        }
        "login_patient" | "3" => {
            expect_arity(tokens, 3)?;
            let next = coordinator
                .login(session, Role::Patient, tokens[1], tokens[2])
                .await?;
            *session = next;
            Ok(format!("patient logged in as {}", tokens[1]))
        }
        "login_caregiver" | "4" => {
            expect_arity(tokens, 3)?;
            let next = coordinator
                .login(session, Role::Caregiver, tokens[1], tokens[2])
                .await?;
            *session = next;
            Ok(format!("caregiver logged in as {}", tokens[1]))
        }
        "search_caregiver_schedule" | "5" => {
            expect_arity(tokens, 2)?;
            let view = coordinator.search_schedule(session, tokens[1]).await?;
            if view.slots.is_empty() {
                return Ok(format!("no caregiver is available on {}", view.date));
            }

            let mut lines = vec![format!("caregivers available on {}:", view.date)];
            for slot in &view.slots {
                lines.push(format!("  {}", slot.caregiver));
            }
            if view.vaccines.is_empty() {
                lines.push("no vaccines are on the market yet".into());
            } else {
                lines.push("available doses:".into());
                for vaccine in &view.vaccines {
                    lines.push(format!("  {}: {}", vaccine.name, vaccine.doses));
                }
            }
            Ok(lines.join("\n"))
        }
        "reserve" | "6" => {
            expect_arity(tokens, 3)?;
            let reservation = coordinator.reserve(session, tokens[1], tokens[2]).await?;
            Ok(format!(
                "your appointment id is {}, your assigned caregiver is {}, your selected vaccine is {}",
                reservation.id, reservation.caregiver, tokens[2]
            ))
        }
        "upload_availability" | "7" => {
            expect_arity(tokens, 2)?;
            coordinator.upload_availability(session, tokens[1]).await?;
            Ok("availability uploaded".into())
        }
        "cancel" | "8" => {
            expect_arity(tokens, 2)?;
            let id: i64 = tokens[1].parse().map_err(|_| {
                SchedulerError::invalid_input("please enter a numeric appointment id")
            })?;
            coordinator.cancel(session, id).await?;
            Ok(format!("appointment {id} cancelled"))
        }
        "add_doses" | "9" => {
            expect_arity(tokens, 3)?;
            let amount: i64 = tokens[2].parse().map_err(|_| {
                SchedulerError::invalid_input("please enter a whole number of doses")
            })?;
            coordinator.add_doses(session, tokens[1], amount).await?;
            Ok("doses updated".into())
        }
        "show_appointments" | "10" => {
            expect_arity(tokens, 1)?;
            let (role, _) = session.require_logged_in()?;
            let appointments = coordinator.list_appointments(session).await?;
            if appointments.is_empty() {
                return Ok("you have no upcoming appointments".into());
            }
            let lines: Vec<String> = appointments
                .iter()
                .map(|appointment| appointment.describe_for(role))
                .collect();
            Ok(lines.join("\n"))
        }
        "logout" | "11" => {
            expect_arity(tokens, 1)?;
            session.require_logged_in()?;
            *session = Session::LoggedOut;
            Ok("you have successfully logged out".into())
        }
        other => Err(SchedulerError::invalid_input(format!(
            "unknown command \"{other}\", please pick one from the list"
        ))),
    }
}

fn expect_arity(tokens: &[&str], n: usize) -> SchedulerResult<()> {
    if tokens.len() != n {
        return Err(SchedulerError::invalid_input(
            "please check your command and its arguments, then try again",
        ));
    }
    Ok(())
}

/// Interactive loop over stdin. Runs until `quit` or end of input.
pub async fn run_loop(coordinator: &Coordinator) -> std::io::Result<()> {
    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();
    let mut session = Session::LoggedOut;

    println!("Welcome to the vaccine reservation scheduler!");
    loop {
        println!();
        println!("{}", help());
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match dispatch(coordinator, &mut session, &line).await {
            Outcome::Message(message) => println!("{message}"),
            Outcome::Quit => {
                println!("goodbye!");
                break;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_pool;

    async fn make_coordinator() -> Coordinator {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        Coordinator::new(pool)
    }

    async fn say(coordinator: &Coordinator, session: &mut Session, line: &str) -> String {
        match dispatch(coordinator, session, line).await {
            Outcome::Message(message) => message,
            Outcome::Quit => panic!("unexpected quit for {line:?}"),
        }
    }

    #[tokio::test]
    async fn empty_line_asks_for_a_command() {
        let coordinator = make_coordinator().await;
        let mut session = Session::LoggedOut;
        let reply = say(&coordinator, &mut session, "   ").await;
        assert!(reply.contains("please enter a command"));
    }

    #[tokio::test]
    async fn quit_by_name_and_by_number() {
        let coordinator = make_coordinator().await;
        let mut session = Session::LoggedOut;
        assert_eq!(dispatch(&coordinator, &mut session, "quit").await, Outcome::Quit);
        assert_eq!(dispatch(&coordinator, &mut session, "12").await, Outcome::Quit);
    }

    #[tokio::test]
    async fn unknown_command_is_reported_not_fatal() {
        let coordinator = make_coordinator().await;
        let mut session = Session::LoggedOut;
        let reply = say(&coordinator, &mut session, "frobnicate").await;
        assert!(reply.contains("unknown command"));
    }

    #[tokio::test]
    async fn wrong_arity_is_reported() {
        let coordinator = make_coordinator().await;
        let mut session = Session::LoggedOut;
        let reply = say(&coordinator, &mut session, "create_patient onlyname").await;
        assert!(reply.contains("check your command"));
    }

    #[tokio::test]
    async fn create_patient_updates_the_session() {
        let coordinator = make_coordinator().await;
        let mut session = Session::LoggedOut;
        let reply = say(&coordinator, &mut session, "create_patient p1 Passw0rd!").await;
        assert!(reply.contains("patient logged in as p1"));
        assert_eq!(session, Session::Patient("p1".into()));
    }

    #[tokio::test]
    async fn numeric_aliases_reach_the_same_commands() {
        let coordinator = make_coordinator().await;
        let mut session = Session::LoggedOut;
        say(&coordinator, &mut session, "2 c1 Passw0rd!").await;
        assert_eq!(session, Session::Caregiver("c1".into()));

        let reply = say(&coordinator, &mut session, "7 2024-06-01").await;
        assert_eq!(reply, "availability uploaded");
    }

    #[tokio::test]
    async fn logout_clears_the_session() {
        let coordinator = make_coordinator().await;
        let mut session = Session::LoggedOut;
        say(&coordinator, &mut session, "create_patient p1 Passw0rd!").await;

        let reply = say(&coordinator, &mut session, "logout").await;
        assert!(reply.contains("logged out"));
        assert_eq!(session, Session::LoggedOut);
    }

    #[tokio::test]
    async fn logout_while_logged_out_is_an_error_message() {
        let coordinator = make_coordinator().await;
        let mut session = Session::LoggedOut;
        let reply = say(&coordinator, &mut session, "logout").await;
        assert!(reply.contains("login"));
    }

    #[tokio::test]
    async fn cancel_rejects_a_non_numeric_id() {
        let coordinator = make_coordinator().await;
        let mut session = Session::LoggedOut;
        say(&coordinator, &mut session, "create_patient p1 Passw0rd!").await;

        let reply = say(&coordinator, &mut session, "cancel abc").await;
        assert!(reply.contains("numeric appointment id"));
    }

    #[tokio::test]
    async fn add_doses_rejects_a_non_numeric_amount() {
        let coordinator = make_coordinator().await;
        let mut session = Session::LoggedOut;
        say(&coordinator, &mut session, "create_caregiver c1 Passw0rd!").await;

        let reply = say(&coordinator, &mut session, "add_doses Pfizer many").await;
        assert!(reply.contains("whole number"));
    }

    #[tokio::test]
    async fn reserve_error_is_rendered_as_a_message() {
        let coordinator = make_coordinator().await;
        let mut session = Session::LoggedOut;
        say(&coordinator, &mut session, "create_patient p1 Passw0rd!").await;

        let reply = say(&coordinator, &mut session, "reserve 2024-06-01 Moderna").await;
        assert!(reply.contains("no caregiver is available"));
    }
}
