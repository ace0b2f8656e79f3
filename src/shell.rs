//! Interactive menu loop
//!
//! Drives the two prompt levels as an explicit state machine. Input and
//! output are injected so the transitions can be exercised in tests with
//! scripted lines.
//!
//! User input errors (an unknown state name, a selection that is not a
//! valid listing index) are reported here and re-prompt. Fetch and parse
//! failures abort the current operation, are reported, and leave the user
//! at the prompt to re-initiate it; nothing is retried.

use std::io::{self, BufRead, Write};

use serde_json::Value;

use crate::data::{NpsClient, PlacesClient, Site};
use crate::fetch::Fetch;

/// Where the menu loop currently is.
#[derive(Debug)]
enum ShellState {
    /// Waiting for a state name at the top-level prompt
    AwaitState,
    /// A listing was just resolved and needs rendering
    ShowingList { state_name: String, sites: Vec<Site> },
    /// Waiting for a site selection against the current listing
    AwaitDetail { sites: Vec<Site> },
    /// The user asked to leave
    Done,
}

/// The interactive shell over the two clients.
pub struct Shell<F, G> {
    nps: NpsClient<F>,
    places: PlacesClient<G>,
}

impl<F: Fetch, G: Fetch> Shell<F, G> {
    pub fn new(nps: NpsClient<F>, places: PlacesClient<G>) -> Self {
        Self { nps, places }
    }

    /// Runs the menu loop until the user exits or input ends.
    pub fn run(&mut self, input: impl BufRead, output: &mut impl Write) -> io::Result<()> {
        let mut lines = input.lines();
        let mut state = ShellState::AwaitState;
        loop {
            state = match state {
                ShellState::AwaitState => self.await_state(&mut lines, output)?,
                ShellState::ShowingList { state_name, sites } => {
                    render_listing(output, &state_name, &sites)?;
                    ShellState::AwaitDetail { sites }
                }
                ShellState::AwaitDetail { sites } => {
                    self.await_detail(&mut lines, output, sites)?
                }
                ShellState::Done => break,
            };
        }
        Ok(())
    }

    /// Top-level prompt: resolve a state name into its site listing.
    fn await_state(
        &mut self,
        lines: &mut impl Iterator<Item = io::Result<String>>,
        output: &mut impl Write,
    ) -> io::Result<ShellState> {
        writeln!(output, "Enter a state name (e.g. Michigan, michigan), or \"exit\":")?;
        let Some(line) = lines.next() else {
            return Ok(ShellState::Done);
        };
        let state_name = line?.trim().to_lowercase();
        if state_name == "exit" {
            return Ok(ShellState::Done);
        }

        let directory = match self.nps.state_directory() {
            Ok(directory) => directory,
            Err(error) => {
                writeln!(output, "[Error] {error}")?;
                return Ok(ShellState::AwaitState);
            }
        };
        // An unknown name is a user input error; the listing is never
        // consulted for it.
        let Some(state_url) = directory.get(&state_name) else {
            writeln!(output, "[Error] Enter a proper state name")?;
            return Ok(ShellState::AwaitState);
        };

        match self.nps.sites_for_state(state_url) {
            Ok(sites) => Ok(ShellState::ShowingList { state_name, sites }),
            Err(error) => {
                writeln!(output, "[Error] {error}")?;
                Ok(ShellState::AwaitState)
            }
        }
    }

    /// Listing prompt: a 1-based index searches nearby places for that site.
    fn await_detail(
        &mut self,
        lines: &mut impl Iterator<Item = io::Result<String>>,
        output: &mut impl Write,
        sites: Vec<Site>,
    ) -> io::Result<ShellState> {
        writeln!(output, "Choose a number for detail search, or \"exit\" or \"back\":")?;
        let Some(line) = lines.next() else {
            return Ok(ShellState::Done);
        };
        let choice = line?.trim().to_lowercase();
        match choice.as_str() {
            "exit" => return Ok(ShellState::Done),
            "back" => return Ok(ShellState::AwaitState),
            _ => {}
        }

        let index = match choice.parse::<usize>() {
            Ok(index) if (1..=sites.len()).contains(&index) => index,
            _ => {
                writeln!(output, "[Error] Invalid input")?;
                return Ok(ShellState::AwaitDetail { sites });
            }
        };

        let site = &sites[index - 1];
        match self.places.nearby(site) {
            Ok(response) => render_places(output, site, &response)?,
            Err(error) => writeln!(output, "[Error] {error}")?,
        }
        Ok(ShellState::AwaitDetail { sites })
    }
}

fn render_header(output: &mut impl Write, title: &str) -> io::Result<()> {
    let rule = "-".repeat(title.len() + 4);
    writeln!(output, "{rule}")?;
    writeln!(output, "| {title} |")?;
    writeln!(output, "{rule}")
}

fn render_listing(output: &mut impl Write, state_name: &str, sites: &[Site]) -> io::Result<()> {
    render_header(output, &format!("List of national sites in {state_name}"))?;
    for (i, site) in sites.iter().enumerate() {
        writeln!(output, "[{}] {}", i + 1, site.info())?;
    }
    Ok(())
}

fn render_places(output: &mut impl Write, site: &Site, response: &Value) -> io::Result<()> {
    let site_name = site.name.as_deref().unwrap_or("no name");
    if site.zipcode.is_none() {
        writeln!(output, "No searchable location for {site_name}")?;
        return Ok(());
    }
    render_header(output, &format!("Places near {site_name}"))?;
    let matches = response.get("searchResults").and_then(Value::as_array);
    for place in matches.into_iter().flatten() {
        writeln!(output, "- {}", format_place(place))?;
    }
    Ok(())
}

/// `<name> (<category>): <address>, <city>`, with blank or missing fields
/// replaced by display placeholders.
fn format_place(place: &Value) -> String {
    let fields = place.get("fields");
    let name = non_blank(place.get("name")).unwrap_or("no name");
    let category = fields
        .and_then(|f| non_blank(f.get("group_sic_code_name_ext")))
        .unwrap_or("no category");
    let address = fields
        .and_then(|f| non_blank(f.get("address")))
        .unwrap_or("no address");
    let city = fields
        .and_then(|f| non_blank(f.get("city")))
        .unwrap_or("no city");
    format!("{name} ({category}): {address}, {city}")
}

fn non_blank(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}
