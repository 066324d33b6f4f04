//! Interactive search session
//!
//! The shell is one UI context: it owns a single controller for its whole
//! lifetime and drives it from stdin lines.

use std::io::Write;

use anyhow::{Context, Result};
use quarry::{
  Config, SearchController, SearchOverrides, Settlement, State,
  query::{SortDirection, SortField},
};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{connect, parse_filter, print_outcome, print_suggestions};

/// One parsed shell line
#[derive(Debug, PartialEq)]
enum Line {
  Text(String),
  Go,
  Filter(String),
  Unfilter(String),
  Reset,
  Clear,
  Page(u32),
  Size(u32),
  Sort(SortField, Option<SortDirection>),
  Open(usize),
  State,
  Quit,
  Empty,
  Invalid(String),
}

fn parse_line(input: &str) -> Line {
  let input = input.trim();
  if input.is_empty() {
    return Line::Empty;
  }
  let Some(command) = input.strip_prefix('/') else {
    return Line::Text(input.to_string());
  };

  let mut parts = command.split_whitespace();
  let name = parts.next().unwrap_or_default();
  let arg = parts.next();
  let number = |arg: Option<&str>| arg.and_then(|a| a.parse::<u32>().ok());

  match (name, arg) {
    ("go", _) => Line::Go,
    ("filter", Some(spec)) => Line::Filter(spec.to_string()),
    ("unfilter", Some(facet)) => Line::Unfilter(facet.to_string()),
    ("reset", _) => Line::Reset,
    ("clear", _) => Line::Clear,
    ("page", a) => number(a).map(Line::Page).unwrap_or(Line::Invalid("usage: /page N".into())),
    ("size", a) => number(a).map(Line::Size).unwrap_or(Line::Invalid("usage: /size N".into())),
    ("sort", Some(field)) => match field.parse::<SortField>() {
      Ok(field) => match parts.next().map(str::parse::<SortDirection>).transpose() {
        Ok(direction) => Line::Sort(field, direction),
        Err(e) => Line::Invalid(e),
      },
      Err(e) => Line::Invalid(e),
    },
    ("open", a) => match number(a) {
      Some(n) if n > 0 => Line::Open(n as usize),
      _ => Line::Invalid("usage: /open N".into()),
    },
    ("state", _) => Line::State,
    ("quit" | "exit" | "q", _) => Line::Quit,
    _ => Line::Invalid(format!("Unknown command: /{}", name)),
  }
}

fn render(state: &State) {
  if let Some(error) = &state.error {
    println!("! {}", error);
  }
  if let Some(outcome) = &state.outcome {
    print_outcome(outcome);
  }
  if let Some(at) = state.last_searched_at {
    println!("(updated {})", at.with_timezone(&chrono::Local).format("%H:%M:%S"));
  }
}

fn prompt(state: &State) -> Result<()> {
  let filters = state.query.active_filter_count();
  if filters > 0 {
    print!("[{} filters] ", filters);
  }
  print!("quarry> ");
  std::io::stdout().flush().context("Failed to write prompt")
}

async fn search(controller: &SearchController) {
  match controller.submit_search(SearchOverrides::default()).await {
    Settlement::Applied => render(&controller.state()),
    other => println!("(search {:?})", other),
  }
}

/// Run the interactive session until EOF or /quit
pub async fn cmd_shell(config: &Config) -> Result<()> {
  let controller = SearchController::new(connect(config)?, config);
  println!("quarry shell - type to search, /go to run, /quit to leave");

  let mut lines = BufReader::new(tokio::io::stdin()).lines();
  loop {
    prompt(&controller.state())?;
    let Some(input) = lines.next_line().await.context("Failed to read input")? else {
      break;
    };

    match parse_line(&input) {
      Line::Empty => {}
      Line::Text(text) => {
        controller.set_query(text.as_str());
        if let Some(outcome) = controller.fetch_suggestions(&text).await
          && !outcome.is_empty()
        {
          print_suggestions(&outcome);
        }
      }
      Line::Go => search(&controller).await,
      Line::Filter(spec) => match parse_filter(&spec) {
        Ok(selection) => {
          controller.set_filters([selection].into());
          search(&controller).await;
        }
        Err(e) => println!("! {}", e),
      },
      Line::Unfilter(facet) => {
        controller.set_filters([(facet, Default::default())].into());
        search(&controller).await;
      }
      Line::Reset => {
        controller.reset_filters();
        search(&controller).await;
      }
      Line::Clear => controller.clear(),
      Line::Page(page) => {
        controller.set_page(page);
        search(&controller).await;
      }
      Line::Size(size) => {
        controller.set_page_size(size);
        search(&controller).await;
      }
      Line::Sort(field, direction) => {
        let direction = direction.unwrap_or(controller.state().query.sort_direction);
        controller.set_sort(field, direction);
        search(&controller).await;
      }
      Line::Open(n) => {
        let state = controller.state();
        match state.results().get(n - 1) {
          Some(result) => {
            controller.track_result_click(result.id.as_str(), (n - 1) as u32);
            println!("{}", result.url.as_deref().unwrap_or(&result.id));
          }
          None => println!("! No result #{} on this page", n),
        }
      }
      Line::State => println!("{}", serde_json::to_string_pretty(&*controller.state())?),
      Line::Quit => break,
      Line::Invalid(message) => println!("! {}", message),
    }
  }

  controller.dispose();
  Ok(())
}
