use crate::command::CommandArgs;
use crate::event::{CalendarEvent, EventForm};
use crate::storage::KeyValueStore;
use crate::store::{EventStore, StoreError};
use crate::validation::{ValidationError, validate_form};
use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use uuid::Uuid;

const HELP_TEXT: &str = "Available commands:
  list - List all stored events
  show <id> - Show one event as JSON
  add \"<title>\" <startDay> <startTime> <endDay> <endTime> [--id <id>] - Create an event
  update <id> [--title ..] [--start-day ..] [--start-time ..] [--end-day ..] [--end-time ..] - Edit an event
  delete <id> - Delete every event with this id
  clear - Remove all events
  help - Show this help
  exit - Exit the application";

/// What the terminal should do after a command ran
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Output(String),
    Exit,
}

pub struct Application<S: KeyValueStore> {
    store: EventStore<S>,
}

impl<S: KeyValueStore> Application<S> {
    pub fn new(store: EventStore<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &EventStore<S> {
        &self.store
    }

    pub fn run(&mut self) -> Result<()> {
        log::info!("Starting calstash terminal");

        let mut rl = DefaultEditor::new()?;
        println!("Welcome to calstash! Type 'help' for commands.");

        loop {
            match rl.readline("📅 ") {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(line.as_str());
                    match self.process_input(&line) {
                        Ok(Response::Output(text)) => println!("{}", text),
                        Ok(Response::Exit) => break,
                        Err(err) => log::error!("Failed to process command: {:?}", err),
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    println!("Error: {:?}", err);
                    break;
                }
            }
        }

        Ok(())
    }

    pub fn process_input(&mut self, line: &str) -> Result<Response> {
        let args = CommandArgs::parse(line)?;
        self.execute(args)
    }

    pub fn execute(&mut self, args: CommandArgs) -> Result<Response> {
        let output = match args.command.as_str() {
            "list" | "ls" => self.list()?,
            "show" => self.show(&args)?,
            "add" | "new" => self.add(&args)?,
            "update" | "edit" => self.update(&args)?,
            "delete" | "rm" => self.delete(&args)?,
            "clear" => {
                self.store.set_events(&[])?;
                "All events removed".to_string()
            }
            "help" => HELP_TEXT.to_string(),
            "exit" | "quit" => return Ok(Response::Exit),
            other => format!("Unknown command '{}'. Type 'help' for available commands.", other),
        };
        Ok(Response::Output(output))
    }

    fn list(&self) -> Result<String> {
        let events = self.store.get_events()?;
        if events.is_empty() {
            return Ok("No events stored".to_string());
        }
        let lines: Vec<String> = events.iter().map(|event| format!("  - {}", event.summary())).collect();
        Ok(format!("{} event(s):\n{}", events.len(), lines.join("\n")))
    }

    fn show(&self, args: &CommandArgs) -> Result<String> {
        let Some(id) = args.args.first() else {
            return Ok("Usage: show <id>".to_string());
        };
        match self.store.find_event(id)? {
            Some(event) => Ok(serde_json::to_string_pretty(&event)?),
            None => Ok(format!("Event '{}' not found", id)),
        }
    }

    fn add(&mut self, args: &CommandArgs) -> Result<String> {
        let positional = |i: usize| args.args.get(i).map(String::as_str).unwrap_or("");
        let form = EventForm::new(positional(0), positional(1), positional(2), positional(3), positional(4));

        let errors = validate_form(&form);
        if !errors.is_empty() {
            return Ok(format_errors(&errors));
        }

        let id = args.flag("--id").map(str::to_string).unwrap_or_else(|| Uuid::new_v4().to_string());
        let event = CalendarEvent::from_form(id, &form);
        let summary = event.summary();
        self.store.add_event(event)?;
        Ok(format!("Created {}", summary))
    }

    fn update(&mut self, args: &CommandArgs) -> Result<String> {
        let Some(id) = args.args.first() else {
            return Ok("Usage: update <id> [--title ..] [--start-day ..] [--start-time ..] [--end-day ..] [--end-time ..]".to_string());
        };
        let Some(existing) = self.store.find_event(id)? else {
            return Ok(format!("Event '{}' not found", id));
        };

        let mut form = EventForm::from_event(&existing);
        for (flag, slot) in [
            ("--title", &mut form.title),
            ("--start-day", &mut form.start_day),
            ("--start-time", &mut form.start_time),
            ("--end-day", &mut form.end_day),
            ("--end-time", &mut form.end_time),
        ] {
            if let Some(value) = args.flag(flag) {
                *slot = Some(value.to_string());
            }
        }

        let errors = validate_form(&form);
        if !errors.is_empty() {
            return Ok(format_errors(&errors));
        }

        let updated = CalendarEvent { extra: existing.extra, ..CalendarEvent::from_form(existing.id, &form) };
        let summary = updated.summary();
        match self.store.update_event(updated) {
            Ok(()) => Ok(format!("Updated {}", summary)),
            Err(StoreError::EventNotFound(id)) => Ok(format!("Event '{}' not found", id)),
            Err(e) => Err(e.into()),
        }
    }

    fn delete(&mut self, args: &CommandArgs) -> Result<String> {
        let Some(id) = args.args.first() else {
            return Ok("Usage: delete <id>".to_string());
        };
        let removed = self.store.delete_event(id)?;
        if removed == 0 {
            Ok(format!("Event '{}' not found", id))
        } else {
            Ok(format!("Deleted {} event(s) with id '{}'", removed, id))
        }
    }
}

fn format_errors(errors: &[ValidationError]) -> String {
    let lines: Vec<String> = errors.iter().map(|e| format!("  - {}", e)).collect();
    format!("Event not saved:\n{}", lines.join("\n"))
}
