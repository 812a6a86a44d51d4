use std::{cell::RefCell, collections::BTreeSet, io::{self, BufRead, Write}, path::PathBuf, rc::Rc, time::Duration};

use eyre::{Result, WrapErr};
use heart_deck::{DeckConfig, QuestionId, Session, filter, logging, navigator::view::NavigatorView, question_source::JsonQuestionSource, store::JsonRatingStore};
use tracing::{info, warn};

const USAGE: &str = "commands: drag <x> | release | next | prev | random | rate <1-5> | tick <ms> | settle | \
                     goto <id> | search <text> | tag <name> | tags | person <name> | people | select <n> | \
                     stats | analysis | quit";

fn print_view(view: &NavigatorView) {
	let Some(current) = &view.current else {
		println!("No questions");
		return;
	};

	let hearts = "♥".repeat(current.rating.value().into());
	let marker = if current.rated { "" } else { " (unrated)" };
	println!("[{}] {}. {}", view.position_label(), current.question.id, current.question.text);
	println!("    {}{}", hearts, marker);

	if let Some(neighbor) = &view.neighbor {
		println!("    beneath: {}. {}", neighbor.question.id, neighbor.question.text);
	}
	println!(
		"    offset {:.0} ({:.1}°) {:?} prev{} next{} random{}",
		view.offset,
		view.rotation_degrees,
		view.phase,
		if view.previous_disabled { "✗" } else { "✓" },
		if view.next_disabled { "✗" } else { "✓" },
		if view.random_disabled { "✗" } else { "✓" },
	);
}

fn main() -> Result<()> {
	color_eyre::install()?;
	logging::init();

	let mut args = std::env::args().skip(1);
	let questions_path = PathBuf::from(args.next().unwrap_or_else(|| "questions-en.json".into()));
	let ratings_path = PathBuf::from(args.next().unwrap_or_else(|| "ratings.json".into()));
	let config_path = PathBuf::from(args.next().unwrap_or_else(|| "deck.toml".into()));

	let config = DeckConfig::load(&config_path).wrap_err("Failed to load deck config")?;
	let store = JsonRatingStore::open(&ratings_path)
		.wrap_err_with(|| format!("Failed to open ratings at {:?}", ratings_path))?;
	let store = Rc::new(RefCell::new(store));

	let session = Session::new(&JsonQuestionSource::new(questions_path), Rc::clone(&store), config);
	let mut selected_tags = BTreeSet::new();

	println!("{}", USAGE);
	print_view(&session.navigator().view());

	let stdin = io::stdin();
	for line in stdin.lock().lines() {
		let line = line?;
		let (command, argument) = line.trim().split_once(' ').unwrap_or((line.trim(), ""));
		let argument = argument.trim();

		match command {
			"" => continue,
			"quit" | "exit" => break,
			"drag" => match argument.parse::<f64>() {
				Ok(x) => println!("{:?}", session.drag_changed(x)),
				Err(_) => warn!("drag needs a number"),
			},
			"release" => println!("{:?}", session.drag_ended()),
			"next" => println!("{:?}", session.next()),
			"prev" => println!("{:?}", session.previous()),
			"random" => println!("{:?}", session.random()),
			"settle" => println!("{:?}", session.settle()),
			"tick" => match argument.parse::<u64>() {
				Ok(ms) => println!("{:?}", session.tick(Duration::from_millis(ms))),
				Err(_) => warn!("tick needs milliseconds"),
			},
			"rate" => match argument.parse::<u8>() {
				Ok(value) => match session.rate_current(value) {
					Ok(_) => {}
					Err(e) => println!("{}", e),
				},
				Err(_) => warn!("rate needs a value from 1 to 5"),
			},
			"goto" => match argument.parse::<u32>() {
				Ok(id) => println!("{}", session.jump_to_question(QuestionId(id))),
				Err(_) => warn!("goto needs a question id"),
			},
			"tag" => {
				filter::toggle_tag(&mut selected_tags, argument);
				println!("tags: {:?}", selected_tags);
			}
			"tags" => println!("{}", filter::unique_tags(session.navigator().deck().questions()).join(", ")),
			"search" => {
				let navigator = session.navigator();
				for question in filter::filter_questions(navigator.deck().questions(), argument, &selected_tags) {
					println!("  {}. {}", question.id, question.text);
				}
				continue;
			}
			"person" => {
				store.borrow_mut().add_entity(argument)?;
			}
			"people" => {
				let store = store.borrow();
				let selected = store.inner().selected().map(|e| e.id);
				for (i, entity) in store.inner().entities().iter().enumerate() {
					let marker = if Some(entity.id) == selected { "*" } else { " " };
					println!("{} {} {}", marker, i, entity.name);
				}
				continue;
			}
			"select" => {
				let id = argument
					.parse::<usize>()
					.ok()
					.and_then(|i| store.borrow().inner().entities().get(i).map(|e| e.id));
				match id {
					Some(id) => store.borrow_mut().select_entity(id)?,
					None => warn!("No such person"),
				}
			}
			"stats" => {
				let summary = session.summary();
				println!("answered {} of {}", summary.answered, summary.total);
				if let Some(average) = summary.average {
					println!("average {:.1} out of 5", average);
				}
				for tag in session.tag_averages() {
					println!("  {:<12} {:.1} ({})", tag.tag, tag.average, tag.count);
				}
				for (question, rating) in session.ratings_series() {
					println!("  Q{} {}", question, "♥".repeat(rating.value().into()));
				}
				continue;
			}
			"analysis" => {
				println!("{}", session.analysis());
				continue;
			}
			_ => {
				println!("{}", USAGE);
				continue;
			}
		}

		print_view(&session.navigator().view());
		io::stdout().flush()?;
	}

	info!("Goodbye");
	session.close();
	Ok(())
}
