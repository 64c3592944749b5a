//! Post-generation integrity checking.
//!
//! Verifies the structural guarantees of a finished [`Model`]:
//! - Signature and parameter counts within the configured bounds
//! - Every index reference resolves (roles, behaviors, connectors, exposed roles, entry calls)
//! - Connector ends share the same interface and never touch infrastructure roles
//! - Allocation groups cover every assembly exactly once
//! - Literal types match the parameters they fill
//!
//! # Usage
//!
//! ```rust,ignore
//! let checker = ModelIntegrityChecker::new(&config);
//! let report = checker.check(&model);
//! if !report.is_valid() {
//!     eprintln!("{report}");
//! }
//! ```

use crate::config::GeneratorConfig;
use crate::model::{
    AssemblyId, BehaviorSpec, Component, Model, ModelStats, Parameter, ParameterSpecification,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntegrityError {
    #[error("Dangling reference: {0} references {1} which does not exist")]
    DanglingReference(String, String),

    #[error("Count out of bounds: {what} is {actual}, expected {min}..={max}")]
    CountOutOfBounds {
        what: String,
        actual: usize,
        min: usize,
        max: usize,
    },

    #[error("Interface mismatch: {0} is bound to {1} but {2} is bound to {3}")]
    InterfaceMismatch(String, String, String, String),

    #[error("Infrastructure role wired: {0}")]
    InfrastructureWired(String),

    #[error("Allocation cover broken: {0}")]
    AllocationCover(String),

    #[error("Argument mismatch: {0}")]
    ArgumentMismatch(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub severity: Severity,
    pub error: String,
    pub context: String,
    pub suggestion: Option<String>,
}

impl Violation {
    pub fn new(severity: Severity, error: IntegrityError, context: impl Into<String>) -> Self {
        Self {
            severity,
            error: error.to_string(),
            context: context.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntegrityReport {
    pub violations: Vec<Violation>,
    pub stats: ModelStats,
}

impl IntegrityReport {
    pub fn new(stats: ModelStats) -> Self {
        Self {
            violations: Vec::new(),
            stats,
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn error_count(&self) -> usize {
        self.violations
            .iter()
            .filter(|v| matches!(v.severity, Severity::Error | Severity::Critical))
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.violations
            .iter()
            .filter(|v| v.severity == Severity::Warning)
            .count()
    }

    pub fn add_violation(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    pub fn summary(&self) -> String {
        format!(
            "Integrity Report: {} components, {} connectors, {} errors, {} warnings",
            self.stats.components,
            self.stats.connectors,
            self.error_count(),
            self.warning_count()
        )
    }
}

impl fmt::Display for IntegrityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.summary())?;
        if !self.violations.is_empty() {
            writeln!(f, "\nViolations:")?;
            for (i, v) in self.violations.iter().enumerate() {
                writeln!(f, "  {}. [{:?}] {}: {}", i + 1, v.severity, v.context, v.error)?;
                if let Some(suggestion) = &v.suggestion {
                    writeln!(f, "     Suggestion: {}", suggestion)?;
                }
            }
        }
        Ok(())
    }
}

/// Bounds a model is checked against, taken from the generating configuration.
#[derive(Debug, Clone)]
pub struct ModelIntegrityChecker {
    min_signatures: usize,
    max_signatures: usize,
    max_parameters: usize,
    max_exposed: usize,
    max_calls: usize,
}

impl ModelIntegrityChecker {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            min_signatures: config.min_signatures_per_interface,
            max_signatures: config.max_signatures_per_interface,
            max_parameters: config.max_parameters_per_signature,
            max_exposed: config.max_exposed_interfaces,
            max_calls: config.max_calls,
        }
    }

    pub fn check(&self, model: &Model) -> IntegrityReport {
        let mut report = IntegrityReport::new(model.stats());
        self.check_interfaces(model, &mut report);
        self.check_components(model, &mut report);
        self.check_system(model, &mut report);
        self.check_allocation(model, &mut report);
        self.check_usage(model, &mut report);
        tracing::debug!(
            errors = report.error_count(),
            warnings = report.warning_count(),
            "integrity check finished"
        );
        report
    }

    fn check_interfaces(&self, model: &Model, report: &mut IntegrityReport) {
        for interface in &model.repository.interfaces {
            let count = interface.signatures.len();
            if count < self.min_signatures || count > self.max_signatures {
                report.add_violation(Violation::new(
                    Severity::Error,
                    IntegrityError::CountOutOfBounds {
                        what: "signatures".into(),
                        actual: count,
                        min: self.min_signatures,
                        max: self.max_signatures,
                    },
                    interface.name.clone(),
                ));
            }
            for signature in &interface.signatures {
                if signature.parameters.len() > self.max_parameters {
                    report.add_violation(Violation::new(
                        Severity::Error,
                        IntegrityError::CountOutOfBounds {
                            what: "parameters".into(),
                            actual: signature.parameters.len(),
                            min: 0,
                            max: self.max_parameters,
                        },
                        format!("{}.{}", interface.name, signature.name),
                    ));
                }
            }
        }
    }

    fn check_components(&self, model: &Model, report: &mut IntegrityReport) {
        for component in &model.repository.components {
            for role in &component.provided_roles {
                if model.repository.interface(role.interface).is_none() {
                    report.add_violation(dangling(&component.name, &role.name, role.interface));
                }
            }
            for role in &component.required_roles {
                if model.interface(role.interface).is_none() {
                    report.add_violation(dangling(&component.name, &role.name, role.interface));
                }
            }
            for behavior in &component.behaviors {
                self.check_behavior(model, component, behavior, report);
            }
        }
    }

    fn check_behavior(
        &self,
        model: &Model,
        component: &Component,
        behavior: &BehaviorSpec,
        report: &mut IntegrityReport,
    ) {
        let implemented = component
            .provided_roles
            .get(behavior.provided_role)
            .and_then(|role| model.repository.interface(role.interface))
            .and_then(|interface| interface.signatures.get(behavior.signature));
        if implemented.is_none() {
            report.add_violation(dangling(
                &component.name,
                "behavior",
                format!("provided role {} signature {}", behavior.provided_role, behavior.signature),
            ));
        }

        for call in &behavior.calls {
            let context = format!("{} behavior call", component.name);
            let Some(role) = component.required_roles.get(call.required_role) else {
                report.add_violation(dangling(&context, "call", format!("required role {}", call.required_role)));
                continue;
            };
            if role.interface != call.signature.interface {
                report.add_violation(Violation::new(
                    Severity::Error,
                    IntegrityError::InterfaceMismatch(
                        role.name.clone(),
                        role.interface.to_string(),
                        "call".into(),
                        call.signature.interface.to_string(),
                    ),
                    context,
                ));
                continue;
            }
            match model.signature(call.signature) {
                Some(signature) => check_arguments(&signature.parameters, &call.arguments, &context, report),
                None => report.add_violation(dangling(
                    &context,
                    "call",
                    format!("{} signature {}", call.signature.interface, call.signature.index),
                )),
            }
        }
    }

    fn check_system(&self, model: &Model, report: &mut IntegrityReport) {
        let system = &model.system;
        if system.assemblies.len() != model.repository.components.len() {
            report.add_violation(
                Violation::new(
                    Severity::Error,
                    IntegrityError::CountOutOfBounds {
                        what: "assemblies".into(),
                        actual: system.assemblies.len(),
                        min: model.repository.components.len(),
                        max: model.repository.components.len(),
                    },
                    system.name.clone(),
                )
                .with_suggestion("Every component is instantiated exactly once"),
            );
        }
        for assembly in &system.assemblies {
            if model.repository.component(assembly.component).is_none() {
                report.add_violation(dangling(&assembly.name, "assembly", assembly.component));
            }
        }

        for connector in &system.connectors {
            let context = format!(
                "connector {} -> {}",
                connector.requiring_assembly, connector.providing_assembly
            );
            let required = model
                .assembly_component(connector.requiring_assembly)
                .and_then(|c| c.required_roles.get(connector.required_role));
            let provided = model
                .assembly_component(connector.providing_assembly)
                .and_then(|c| c.provided_roles.get(connector.provided_role));
            let (Some(required), Some(provided)) = (required, provided) else {
                report.add_violation(
                    Violation::new(
                        Severity::Critical,
                        IntegrityError::DanglingReference(context.clone(), "connector end".into()),
                        context,
                    )
                    .with_suggestion("Connectors must reference existing assemblies and roles"),
                );
                continue;
            };
            if required.is_infrastructure() {
                report.add_violation(Violation::new(
                    Severity::Error,
                    IntegrityError::InfrastructureWired(required.name.clone()),
                    context,
                ));
                continue;
            }
            if required.interface.domain() != Some(provided.interface) {
                report.add_violation(Violation::new(
                    Severity::Error,
                    IntegrityError::InterfaceMismatch(
                        required.name.clone(),
                        required.interface.to_string(),
                        provided.name.clone(),
                        provided.interface.to_string(),
                    ),
                    context,
                ));
            }
        }

        if system.exposed_roles.len() > self.max_exposed {
            report.add_violation(Violation::new(
                Severity::Error,
                IntegrityError::CountOutOfBounds {
                    what: "exposed roles".into(),
                    actual: system.exposed_roles.len(),
                    min: 0,
                    max: self.max_exposed,
                },
                system.name.clone(),
            ));
        }
        for exposed in &system.exposed_roles {
            let provided = model
                .assembly_component(exposed.assembly)
                .and_then(|c| c.provided_roles.get(exposed.provided_role));
            match provided {
                Some(role) if role.interface == exposed.interface => {}
                Some(role) => report.add_violation(Violation::new(
                    Severity::Error,
                    IntegrityError::InterfaceMismatch(
                        exposed.name.clone(),
                        exposed.interface.to_string(),
                        role.name.clone(),
                        role.interface.to_string(),
                    ),
                    system.name.clone(),
                )),
                None => report.add_violation(dangling(&exposed.name, "exposed role", exposed.assembly)),
            }
        }
    }

    fn check_allocation(&self, model: &Model, report: &mut IntegrityReport) {
        let allocation = &model.allocation;
        if allocation.is_empty() {
            if !model.environment.containers.is_empty() && !model.system.assemblies.is_empty() {
                report.add_violation(Violation::new(
                    Severity::Error,
                    IntegrityError::AllocationCover("no groups although containers and assemblies exist".into()),
                    allocation.name.clone(),
                ));
            }
            return;
        }

        let mut seen = vec![0usize; model.system.assemblies.len()];
        for group in &allocation.groups {
            if group.container.index() >= model.environment.containers.len() {
                report.add_violation(dangling(&group.name, "allocation group", group.container));
            }
            if group.assemblies.is_empty() {
                report.add_violation(Violation::new(
                    Severity::Error,
                    IntegrityError::AllocationCover("empty group".into()),
                    group.name.clone(),
                ));
            }
            for assembly in &group.assemblies {
                match seen.get_mut(assembly.index()) {
                    Some(count) => *count += 1,
                    None => report.add_violation(dangling(&group.name, "allocation group", *assembly)),
                }
            }
        }

        for (idx, count) in seen.into_iter().enumerate() {
            if count != 1 {
                report.add_violation(Violation::new(
                    Severity::Error,
                    IntegrityError::AllocationCover(format!(
                        "{} allocated {count} times",
                        AssemblyId::from_index(idx)
                    )),
                    allocation.name.clone(),
                ));
            }
        }
    }

    fn check_usage(&self, model: &Model, report: &mut IntegrityReport) {
        let Some(scenario) = &model.usage.scenario else {
            if !model.system.exposed_roles.is_empty() {
                report.add_violation(Violation::new(
                    Severity::Warning,
                    IntegrityError::CountOutOfBounds {
                        what: "usage scenarios".into(),
                        actual: 0,
                        min: 1,
                        max: 1,
                    },
                    model.usage.name.clone(),
                ));
            }
            return;
        };

        if scenario.calls.len() > self.max_calls {
            report.add_violation(Violation::new(
                Severity::Error,
                IntegrityError::CountOutOfBounds {
                    what: "entry calls".into(),
                    actual: scenario.calls.len(),
                    min: 0,
                    max: self.max_calls,
                },
                scenario.name.clone(),
            ));
        }

        for call in &scenario.calls {
            let signature = model
                .system
                .exposed_role(call.exposed_role)
                .and_then(|exposed| model.repository.interface(exposed.interface))
                .and_then(|interface| interface.signatures.get(call.signature));
            match signature {
                Some(signature) => {
                    check_arguments(&signature.parameters, &call.arguments, &scenario.name, report)
                }
                None => report.add_violation(dangling(
                    &scenario.name,
                    "entry call",
                    format!("{} signature {}", call.exposed_role, call.signature),
                )),
            }
        }
    }
}

fn dangling(owner: &str, what: &str, target: impl fmt::Display) -> Violation {
    Violation::new(
        Severity::Critical,
        IntegrityError::DanglingReference(format!("{owner} {what}"), target.to_string()),
        owner.to_string(),
    )
}

fn check_arguments(
    parameters: &[Parameter],
    arguments: &[ParameterSpecification],
    context: &str,
    report: &mut IntegrityReport,
) {
    if parameters.len() != arguments.len() {
        report.add_violation(Violation::new(
            Severity::Error,
            IntegrityError::ArgumentMismatch(format!(
                "{} arguments for {} parameters",
                arguments.len(),
                parameters.len()
            )),
            context.to_string(),
        ));
        return;
    }
    for (parameter, argument) in parameters.iter().zip(arguments) {
        if parameter.name != argument.parameter || parameter.kind != argument.value.kind() {
            report.add_violation(Violation::new(
                Severity::Error,
                IntegrityError::ArgumentMismatch(format!(
                    "{} ({}) filled by {} ({})",
                    parameter.name,
                    parameter.kind,
                    argument.parameter,
                    argument.value.kind()
                )),
                context.to_string(),
            ));
        }
    }
}
