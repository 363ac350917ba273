use crate::domain::range::Position;
use crate::domain::trace::{NodeIndex, Trace};
use crate::domain::view::View;
use crate::ports::{TraceSource, ViewExporter};
use anyhow::{Context, Result};

/// Selection state of a code view over one trace.
///
/// The engine itself is stateless; this holds what the user currently looks
/// at and turns gestures into new selections. Loading another trace means
/// building a new navigator.
#[derive(Debug, Clone)]
pub struct Navigator {
    trace: Trace,
    function: NodeIndex,
    iterations: Vec<NodeIndex>,
    reveal: Option<Position>,
}

impl Navigator {
    /// Start at the entry function with its default iterations.
    pub fn new(trace: Trace) -> Self {
        let function = trace.main();
        let iterations = trace.select_iterations(function, &[]);
        Self {
            trace,
            function,
            iterations,
            reveal: None,
        }
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    pub fn function(&self) -> NodeIndex {
        self.function
    }

    pub fn iterations(&self) -> &[NodeIndex] {
        &self.iterations
    }

    /// Enter `function` fresh. Returns false, leaving the state untouched,
    /// if the index is not a function.
    pub fn select_function(&mut self, function: NodeIndex) -> bool {
        if !self.trace.is_function(function) {
            tracing::debug!("[Navigator] Ignoring selection of non-function {}", function);
            return false;
        }
        self.function = function;
        self.iterations = self.trace.select_iterations(function, &[]);
        self.reveal = None;
        true
    }

    /// Follow the jump anchored at `position`, if there is one.
    pub fn click(&mut self, position: Position) -> bool {
        match self.trace.resolve_click(self.function, &self.iterations, position) {
            Some(navigation) => {
                tracing::debug!(
                    "[Navigator] Jump {} -> {} at {:?}",
                    self.function,
                    navigation.function,
                    navigation.position
                );
                self.function = navigation.function;
                self.iterations = navigation.iterations;
                self.reveal = navigation.position;
                true
            }
            None => false,
        }
    }

    /// Switch the loop selected at `slot` to another iteration number.
    ///
    /// Slots before it are kept; loops nested in the new iteration and loops
    /// after it are re-selected from their first iteration. An unknown
    /// iteration number keeps the current one. Returns whether the selection
    /// changed.
    pub fn set_iteration(&mut self, slot: usize, iteration: u32) -> bool {
        let Some(&current) = self.iterations.get(slot) else {
            return false;
        };
        let next = self.trace.change_iteration(current, iteration);
        if next == current {
            return false;
        }
        let prior = [&self.iterations[..slot], &[next][..]].concat();
        self.iterations = self.trace.select_iterations(self.function, &prior);
        self.reveal = None;
        true
    }

    pub fn view(&self) -> View {
        self.trace.view(self.function, &self.iterations, self.reveal)
    }
}

/// Load a trace, resolve one view of it and export the result.
pub struct ExportUsecase<'a> {
    pub source: &'a dyn TraceSource,
    pub exporter: &'a dyn ViewExporter,
}

impl<'a> ExportUsecase<'a> {
    pub fn run(
        &self,
        function: Option<NodeIndex>,
        iterations: Option<&[NodeIndex]>,
        export_path: &str,
    ) -> Result<View> {
        let records = self.source.load_records()?;
        let trace = Trace::load(records).context("Trace failed structural validation")?;

        let mut navigator = Navigator::new(trace);
        if let Some(function) = function {
            if !navigator.select_function(function) {
                anyhow::bail!("Node {} is not a function", function);
            }
        }

        let view = match iterations {
            Some(iterations) => navigator.trace().view(navigator.function(), iterations, None),
            None => navigator.view(),
        };
        self.exporter
            .export(navigator.trace(), &view, export_path)
            .with_context(|| format!("Failed to write {}", export_path))?;
        Ok(view)
    }
}
