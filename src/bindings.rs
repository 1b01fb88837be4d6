//! Explicit reactive wiring between UI inputs and chart outputs.
//!
//! A [`Binding`] declares the inputs it reads, the output slots it writes and a
//! pure transform between them. The [`BindingGraph`] owns the current input
//! values and output slots; whenever an input changes it re-runs exactly the
//! bindings that declared that input, in registration order.
//!
//! ```text
//!  set_input(Statistic, "Attack")
//!        │
//!        ├─> bindings declaring Statistic ─> transform(dataset, inputs)
//!        │                                       │
//!        │                     Ok(values) ───────┴──> replace all declared outputs
//!        │                     Err(e)     ──────────> keep old outputs, record failure
//!        └─> Evaluation { evaluated, failures }
//! ```
//!
//! Outputs of one binding are replaced together or not at all. A transform only
//! sees its declared inputs through [`InputView`].

use crate::dataset::Dataset;
use crate::error::{DashboardError, Result};
use crate::figure::{FigureSpec, TableStyle};
use crate::theme::Theme;
use std::collections::BTreeMap;
use std::sync::Arc;

pub mod dashboard;

pub use dashboard::{ChartSettings, Selections, build_dashboard};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InputId {
    /// Multi-select type filter.
    SelectedTypes,
    /// Statistic column for the mean chart.
    Statistic,
    /// Single-select type for the detail charts.
    SelectedType,
    Theme,
    /// Ascending (`true`) or descending ranking for the top-N chart.
    RankOrder,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutputId {
    MeanByTypeChart,
    HeightWeightChart,
    AttackDefenseChart,
    SpeedHistogram,
    TypeCountChart,
    TopTotalChart,
    TableStyle,
}

#[derive(Clone, Debug, PartialEq)]
pub enum InputValue {
    Types(Vec<String>),
    Choice(String),
    Theme(Theme),
    Flag(bool),
}

#[derive(Clone, Debug, PartialEq)]
pub enum OutputValue {
    Figure(FigureSpec),
    Table(TableStyle),
}

/// Read access to the declared inputs of one binding.
pub struct InputView<'a> {
    binding: &'static str,
    declared: &'a [InputId],
    values: &'a BTreeMap<InputId, InputValue>,
}

impl InputView<'_> {
    pub fn get(&self, id: InputId) -> Result<&InputValue> {
        if !self.declared.contains(&id) {
            return Err(DashboardError::Binding(format!(
                "'{}' read undeclared input {id:?}",
                self.binding
            )));
        }
        self.values.get(&id).ok_or_else(|| {
            DashboardError::Binding(format!("input {id:?} has no value for '{}'", self.binding))
        })
    }

    pub fn types(&self, id: InputId) -> Result<&[String]> {
        match self.get(id)? {
            InputValue::Types(types) => Ok(types),
            other => Err(self.mismatch(id, "a type list", other)),
        }
    }

    pub fn choice(&self, id: InputId) -> Result<&str> {
        match self.get(id)? {
            InputValue::Choice(choice) => Ok(choice),
            other => Err(self.mismatch(id, "a single choice", other)),
        }
    }

    pub fn theme(&self, id: InputId) -> Result<Theme> {
        match self.get(id)? {
            InputValue::Theme(theme) => Ok(*theme),
            other => Err(self.mismatch(id, "a theme", other)),
        }
    }

    pub fn flag(&self, id: InputId) -> Result<bool> {
        match self.get(id)? {
            InputValue::Flag(flag) => Ok(*flag),
            other => Err(self.mismatch(id, "a flag", other)),
        }
    }

    fn mismatch(&self, id: InputId, expected: &str, found: &InputValue) -> DashboardError {
        DashboardError::Binding(format!(
            "'{}' expected {expected} for {id:?}, found {found:?}",
            self.binding
        ))
    }
}

pub type Transform =
    Box<dyn Fn(&Dataset, &InputView<'_>) -> Result<Vec<OutputValue>> + Send + Sync>;

pub struct Binding {
    name: &'static str,
    inputs: Vec<InputId>,
    outputs: Vec<OutputId>,
    transform: Transform,
}

impl Binding {
    /// `transform` must return one value per entry of `outputs`, in order.
    pub fn new<F>(
        name: &'static str,
        inputs: impl Into<Vec<InputId>>,
        outputs: impl Into<Vec<OutputId>>,
        transform: F,
    ) -> Self
    where
        F: Fn(&Dataset, &InputView<'_>) -> Result<Vec<OutputValue>> + Send + Sync + 'static,
    {
        Self {
            name,
            inputs: inputs.into(),
            outputs: outputs.into(),
            transform: Box::new(transform),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn inputs(&self) -> &[InputId] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[OutputId] {
        &self.outputs
    }

    pub fn depends_on(&self, id: InputId) -> bool {
        self.inputs.contains(&id)
    }
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("name", &self.name)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BindingFailure {
    pub binding: &'static str,
    pub message: String,
}

/// What one dispatch did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Evaluation {
    /// Bindings that ran, in order, whether they succeeded or not.
    pub evaluated: Vec<&'static str>,
    pub failures: Vec<BindingFailure>,
}

impl Evaluation {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct BindingGraph {
    dataset: Arc<Dataset>,
    bindings: Vec<Binding>,
    inputs: BTreeMap<InputId, InputValue>,
    outputs: BTreeMap<OutputId, OutputValue>,
    failures: BTreeMap<&'static str, String>,
}

impl BindingGraph {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self {
            dataset,
            bindings: Vec::new(),
            inputs: BTreeMap::new(),
            outputs: BTreeMap::new(),
            failures: BTreeMap::new(),
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Adds a binding. Each output slot has exactly one writer.
    pub fn register(&mut self, binding: Binding) -> Result<()> {
        if binding.outputs.is_empty() {
            return Err(DashboardError::Binding(format!(
                "'{}' declares no outputs",
                binding.name
            )));
        }
        for existing in &self.bindings {
            if existing.name == binding.name {
                return Err(DashboardError::Binding(format!(
                    "a binding named '{}' is already registered",
                    binding.name
                )));
            }
            if let Some(slot) = binding
                .outputs
                .iter()
                .find(|slot| existing.outputs.contains(slot))
            {
                return Err(DashboardError::Binding(format!(
                    "output {slot:?} of '{}' is already written by '{}'",
                    binding.name, existing.name
                )));
            }
        }
        tracing::debug!(
            binding = binding.name,
            inputs = ?binding.inputs,
            outputs = ?binding.outputs,
            "Registered binding"
        );
        self.bindings.push(binding);
        Ok(())
    }

    /// Stores an input value without running anything. Used to prime the graph
    /// before [`BindingGraph::evaluate_all`].
    pub fn seed_input(&mut self, id: InputId, value: InputValue) {
        self.inputs.insert(id, value);
    }

    /// Changes one input and re-runs every binding that declared it.
    ///
    /// Setting an input to its current value runs nothing.
    pub fn set_input(&mut self, id: InputId, value: InputValue) -> Evaluation {
        if self.inputs.get(&id) == Some(&value) {
            return Evaluation::default();
        }
        tracing::debug!(input = ?id, value = ?value, "Input changed");
        self.inputs.insert(id, value);

        let affected: Vec<usize> = self
            .bindings
            .iter()
            .enumerate()
            .filter(|(_, b)| b.depends_on(id))
            .map(|(i, _)| i)
            .collect();
        self.run(affected)
    }

    /// Runs every binding once, e.g. at startup.
    pub fn evaluate_all(&mut self) -> Evaluation {
        self.run((0..self.bindings.len()).collect())
    }

    pub fn input(&self, id: InputId) -> Option<&InputValue> {
        self.inputs.get(&id)
    }

    pub fn output(&self, id: OutputId) -> Option<&OutputValue> {
        self.outputs.get(&id)
    }

    pub fn figure(&self, id: OutputId) -> Option<&FigureSpec> {
        match self.outputs.get(&id) {
            Some(OutputValue::Figure(figure)) => Some(figure),
            _ => None,
        }
    }

    pub fn table_style(&self) -> Option<&TableStyle> {
        match self.outputs.get(&OutputId::TableStyle) {
            Some(OutputValue::Table(style)) => Some(style),
            _ => None,
        }
    }

    /// Last error of a binding, cleared by its next successful run.
    pub fn failure(&self, binding: &str) -> Option<&str> {
        self.failures.get(binding).map(String::as_str)
    }

    /// Last error of the binding that writes `output`.
    pub fn failure_for_output(&self, output: OutputId) -> Option<&str> {
        self.bindings
            .iter()
            .find(|b| b.outputs.contains(&output))
            .and_then(|b| self.failure(b.name))
    }

    fn run(&mut self, indices: Vec<usize>) -> Evaluation {
        let mut report = Evaluation::default();

        for idx in indices {
            let Some(binding) = self.bindings.get(idx) else {
                continue;
            };
            let name = binding.name;
            let result = self.compute(binding);
            report.evaluated.push(name);

            match result {
                Ok(values) => {
                    self.outputs.extend(values);
                    self.failures.remove(name);
                }
                Err(e) => {
                    tracing::warn!(binding = name, error = %e, "Binding evaluation failed");
                    let message = e.to_string();
                    self.failures.insert(name, message.clone());
                    report.failures.push(BindingFailure {
                        binding: name,
                        message,
                    });
                }
            }
        }

        tracing::debug!(evaluated = ?report.evaluated, failed = report.failures.len(), "Dispatch finished");
        report
    }

    /// Runs the transform and pairs its values with the declared slots. Nothing
    /// is written here.
    fn compute(&self, binding: &Binding) -> Result<Vec<(OutputId, OutputValue)>> {
        let view = InputView {
            binding: binding.name,
            declared: &binding.inputs,
            values: &self.inputs,
        };
        let values = (binding.transform)(&self.dataset, &view)?;
        if values.len() != binding.outputs.len() {
            return Err(DashboardError::Binding(format!(
                "'{}' produced {} values for {} outputs",
                binding.name,
                values.len(),
                binding.outputs.len()
            )));
        }
        Ok(binding.outputs.iter().copied().zip(values).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Creature;
    use crate::figure::ChartKind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn dataset() -> Arc<Dataset> {
        Arc::new(
            Dataset::from_rows(
                vec!["HP".to_owned()],
                vec![
                    Creature::new("A", "Fire", 1.0, 1.0, vec![10.0]),
                    Creature::new("B", "Water", 1.0, 1.0, vec![20.0]),
                ],
            )
            .expect("valid rows"),
        )
    }

    fn titled(title: &str) -> OutputValue {
        OutputValue::Figure(FigureSpec::new(ChartKind::Bar, title, Theme::Light))
    }

    fn title_of(graph: &BindingGraph, id: OutputId) -> Option<String> {
        graph.figure(id).map(|f| f.title.clone())
    }

    /// Binding echoing the statistic choice into two slots, counting its runs.
    fn echo(counter: Arc<AtomicUsize>) -> Binding {
        Binding::new(
            "echo",
            [InputId::Statistic],
            [OutputId::MeanByTypeChart, OutputId::HeightWeightChart],
            move |dataset, inputs| {
                counter.fetch_add(1, Ordering::SeqCst);
                let stat = inputs.choice(InputId::Statistic)?;
                dataset.require_statistic(stat)?;
                Ok(vec![titled(stat), titled(&format!("{stat}!"))])
            },
        )
    }

    #[test]
    fn test_only_dependent_bindings_run() {
        let echo_runs = Arc::new(AtomicUsize::new(0));
        let theme_runs = Arc::new(AtomicUsize::new(0));
        let mut graph = BindingGraph::new(dataset());
        graph.register(echo(echo_runs.clone())).expect("register echo");
        let counter = theme_runs.clone();
        graph
            .register(Binding::new(
                "style",
                [InputId::Theme],
                [OutputId::TableStyle],
                move |_, inputs| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    let theme = inputs.theme(InputId::Theme)?;
                    Ok(vec![OutputValue::Table(TableStyle::for_theme(theme, 10))])
                },
            ))
            .expect("register style");

        graph.seed_input(InputId::Statistic, InputValue::Choice("HP".to_owned()));
        graph.seed_input(InputId::Theme, InputValue::Theme(Theme::Light));
        assert!(graph.evaluate_all().is_clean());
        assert_eq!(echo_runs.load(Ordering::SeqCst), 1);
        assert_eq!(theme_runs.load(Ordering::SeqCst), 1);

        let report = graph.set_input(InputId::Theme, InputValue::Theme(Theme::Dark));
        assert_eq!(report.evaluated, ["style"]);
        assert_eq!(echo_runs.load(Ordering::SeqCst), 1);
        assert_eq!(
            graph.table_style().map(|s| s.theme),
            Some(Theme::Dark)
        );
    }

    #[test]
    fn test_unchanged_input_is_noop() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut graph = BindingGraph::new(dataset());
        graph.register(echo(runs.clone())).expect("register");
        graph.seed_input(InputId::Statistic, InputValue::Choice("HP".to_owned()));
        graph.evaluate_all();

        let report = graph.set_input(InputId::Statistic, InputValue::Choice("HP".to_owned()));
        assert!(report.evaluated.is_empty());
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failure_keeps_previous_outputs_together() {
        let mut graph = BindingGraph::new(dataset());
        graph
            .register(echo(Arc::new(AtomicUsize::new(0))))
            .expect("register");
        graph.seed_input(InputId::Statistic, InputValue::Choice("HP".to_owned()));
        graph.evaluate_all();

        let report = graph.set_input(
            InputId::Statistic,
            InputValue::Choice("NotAColumn".to_owned()),
        );
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].message.contains("NotAColumn"));

        // both slots still show the last good evaluation
        assert_eq!(title_of(&graph, OutputId::MeanByTypeChart).as_deref(), Some("HP"));
        assert_eq!(title_of(&graph, OutputId::HeightWeightChart).as_deref(), Some("HP!"));
        assert!(graph.failure("echo").is_some());
        assert!(graph.failure_for_output(OutputId::HeightWeightChart).is_some());

        // a later success clears the recorded failure
        graph.set_input(InputId::Statistic, InputValue::Choice("HP".to_owned()));
        assert!(graph.failure("echo").is_none());
    }

    #[test]
    fn test_wrong_output_arity_writes_nothing() {
        let mut graph = BindingGraph::new(dataset());
        graph
            .register(Binding::new(
                "short",
                [InputId::Theme],
                [OutputId::AttackDefenseChart, OutputId::SpeedHistogram],
                |_, _| Ok(vec![titled("only one")]),
            ))
            .expect("register");
        graph.seed_input(InputId::Theme, InputValue::Theme(Theme::Light));

        let report = graph.evaluate_all();
        assert!(!report.is_clean());
        assert!(graph.output(OutputId::AttackDefenseChart).is_none());
        assert!(graph.output(OutputId::SpeedHistogram).is_none());
    }

    #[test]
    fn test_undeclared_input_cannot_be_read() {
        let mut graph = BindingGraph::new(dataset());
        graph
            .register(Binding::new(
                "sneaky",
                [InputId::Theme],
                [OutputId::TableStyle],
                |_, inputs| {
                    let stat = inputs.choice(InputId::Statistic)?;
                    Ok(vec![titled(stat)])
                },
            ))
            .expect("register");
        graph.seed_input(InputId::Theme, InputValue::Theme(Theme::Light));
        graph.seed_input(InputId::Statistic, InputValue::Choice("HP".to_owned()));

        let report = graph.evaluate_all();
        assert!(report.failures[0].message.contains("undeclared"));
    }

    #[test]
    fn test_register_rejects_shared_output_and_empty_outputs() {
        let mut graph = BindingGraph::new(dataset());
        graph
            .register(echo(Arc::new(AtomicUsize::new(0))))
            .expect("register");

        let clash = Binding::new(
            "clash",
            [InputId::Theme],
            [OutputId::HeightWeightChart],
            |_, _| Ok(Vec::new()),
        );
        assert!(matches!(
            graph.register(clash),
            Err(DashboardError::Binding(_))
        ));

        let empty = Binding::new(
            "empty",
            [InputId::Theme],
            Vec::<OutputId>::new(),
            |_, _| Ok(Vec::new()),
        );
        assert!(graph.register(empty).is_err());
        assert_eq!(graph.bindings().len(), 1);
    }

    #[test]
    fn test_input_type_mismatch() {
        let mut graph = BindingGraph::new(dataset());
        graph
            .register(echo(Arc::new(AtomicUsize::new(0))))
            .expect("register");
        graph.seed_input(InputId::Statistic, InputValue::Flag(true));
        let report = graph.evaluate_all();
        assert!(report.failures[0].message.contains("single choice"));
    }
}
