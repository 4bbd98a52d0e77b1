//! Progress lines emitted while an atlas is built.

use std::path::{Path, PathBuf};

use crate::builder::Placement;

pub const NO_IMAGES_MESSAGE: &str = "No images found in the folder.";

pub trait Reporter {
    fn placed(&mut self, placement: &Placement);
    fn no_inputs(&mut self);
    fn saved(&mut self, output: &Path);
}

pub fn placement_line(p: &Placement) -> String {
    format!("{}: ({}, {})", p.id.display(), p.x, p.y)
}

pub fn saved_line(output: &Path) -> String {
    format!("Atlas saved as {}", output.display())
}

/// Prints one line per event to stdout.
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn placed(&mut self, placement: &Placement) { println!("{}", placement_line(placement)); }
    fn no_inputs(&mut self) { println!("{NO_IMAGES_MESSAGE}"); }
    fn saved(&mut self, output: &Path) { println!("{}", saved_line(output)); }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Placed(Placement),
    NoInputs,
    Saved(PathBuf),
}

/// Keeps every event in memory instead of printing it.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub events: Vec<Event>,
}

impl RecordingReporter {
    pub fn lines(&self) -> Vec<String> {
        self.events
            .iter()
            .map(|e| match e {
                Event::Placed(p) => placement_line(p),
                Event::NoInputs => NO_IMAGES_MESSAGE.to_string(),
                Event::Saved(path) => saved_line(path),
            })
            .collect()
    }
}

impl Reporter for RecordingReporter {
    fn placed(&mut self, placement: &Placement) { self.events.push(Event::Placed(placement.clone())); }
    fn no_inputs(&mut self) { self.events.push(Event::NoInputs); }
    fn saved(&mut self, output: &Path) { self.events.push(Event::Saved(output.to_path_buf())); }
}
