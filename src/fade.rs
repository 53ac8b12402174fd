//! One-shot fade-in tracking.
//!
//! Elements tagged `fade-in` become `visible` the first time at least 15% of
//! them enters the viewport, then stop being watched. Nothing ever removes
//! the marker again.

use std::collections::BTreeSet;

pub const FADE_CLASS: &str = "fade-in";
pub const NO_FADE_CLASS: &str = "no-fade";
pub const VISIBLE_CLASS: &str = "visible";
pub const DEFAULT_THRESHOLD: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(usize);

#[derive(Debug, Clone, Default)]
pub struct Element {
    classes: BTreeSet<String>,
}

impl Element {
    pub fn with_classes(classes: &str) -> Self {
        Self {
            classes: classes.split_whitespace().map(str::to_string).collect(),
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn add_class(&mut self, class: &str) {
        self.classes.insert(class.to_string());
    }
}

#[derive(Debug, Default)]
pub struct Document {
    elements: Vec<Element>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, element: Element) -> ElementId {
        self.elements.push(element);
        ElementId(self.elements.len() - 1)
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.0)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(id.0)
    }

    pub fn ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        (0..self.elements.len()).map(ElementId)
    }
}

/// How much of an element is inside the viewport, from 0.0 to 1.0.
#[derive(Debug, Clone, Copy)]
pub struct Intersection {
    pub target: ElementId,
    pub ratio: f64,
}

#[derive(Debug)]
pub struct FadeObserver {
    threshold: f64,
    observed: Vec<bool>,
}

impl FadeObserver {
    /// Starts watching every `fade-in` element that has not opted out.
    pub fn attach(document: &Document) -> Self {
        Self::with_threshold(document, DEFAULT_THRESHOLD)
    }

    pub fn with_threshold(document: &Document, threshold: f64) -> Self {
        let observed = document
            .elements
            .iter()
            .map(|el| el.has_class(FADE_CLASS) && !el.has_class(NO_FADE_CLASS))
            .collect();
        Self {
            threshold,
            observed,
        }
    }

    pub fn is_observing(&self, id: ElementId) -> bool {
        self.observed.get(id.0).copied().unwrap_or(false)
    }

    pub fn observed_count(&self) -> usize {
        self.observed.iter().filter(|o| **o).count()
    }

    /// Applies a batch of viewport changes. Returns the elements that became
    /// visible in this batch.
    pub fn on_intersections(
        &mut self,
        document: &mut Document,
        entries: &[Intersection],
    ) -> Vec<ElementId> {
        let mut revealed = Vec::new();

        for entry in entries {
            if !self.is_observing(entry.target) {
                continue;
            }
            let Some(element) = document.get_mut(entry.target) else {
                continue;
            };

            if element.has_class(NO_FADE_CLASS) {
                self.observed[entry.target.0] = false;
                continue;
            }

            if entry.ratio > 0.0 && entry.ratio >= self.threshold {
                element.add_class(VISIBLE_CLASS);
                self.observed[entry.target.0] = false;
                revealed.push(entry.target);
            }
        }

        revealed
    }
}
