//! Fixed "standard library" content consumed by the generator.
//!
//! Both fixtures are plain values built fresh for every run and moved into the
//! finished [`crate::model::Model`]; nothing here is process-wide.

use crate::model::{
    Interface, Parameter, PrimitiveKind, PrimitiveType, ResourceInterfaceKind, Signature,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

const DEFAULT_CONTAINER_NAME: &str = "ApplicationServer";
const DEFAULT_CPU_RATE: f64 = 1_000_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum SchedulingPolicy {
    FirstComeFirstServe,
    ProcessorSharing,
    Delay,
}

/// Resource type offering one of the resource interfaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProcessingResourceType {
    pub name: String,
    pub provides: ResourceInterfaceKind,
}

/// Primitive types, resource interfaces and scheduling policies shared by every model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StandardDefinitions {
    pub primitive_types: Vec<PrimitiveType>,
    pub cpu_interface: Interface,
    pub hdd_interface: Interface,
    pub scheduling_policies: Vec<SchedulingPolicy>,
    pub resource_types: Vec<ProcessingResourceType>,
}

impl StandardDefinitions {
    pub fn new() -> Self {
        Self {
            primitive_types: PrimitiveKind::all()
                .into_iter()
                .map(|kind| PrimitiveType {
                    name: kind.to_string(),
                    kind,
                })
                .collect(),
            cpu_interface: Interface {
                name: "ICPU".to_string(),
                signatures: vec![amount_operation("process")],
            },
            hdd_interface: Interface {
                name: "IHDD".to_string(),
                signatures: vec![amount_operation("read"), amount_operation("write")],
            },
            scheduling_policies: vec![
                SchedulingPolicy::FirstComeFirstServe,
                SchedulingPolicy::ProcessorSharing,
                SchedulingPolicy::Delay,
            ],
            resource_types: vec![
                ProcessingResourceType {
                    name: "CPUResource".to_string(),
                    provides: ResourceInterfaceKind::Cpu,
                },
                ProcessingResourceType {
                    name: "HDDResource".to_string(),
                    provides: ResourceInterfaceKind::Hdd,
                },
            ],
        }
    }

    pub fn resource_interface(&self, kind: ResourceInterfaceKind) -> &Interface {
        match kind {
            ResourceInterfaceKind::Cpu => &self.cpu_interface,
            ResourceInterfaceKind::Hdd => &self.hdd_interface,
        }
    }
}

impl Default for StandardDefinitions {
    fn default() -> Self {
        Self::new()
    }
}

fn amount_operation(name: &str) -> Signature {
    Signature {
        name: name.to_string(),
        parameters: vec![Parameter {
            name: "amount".to_string(),
            kind: PrimitiveKind::Double,
        }],
        return_type: None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProcessingResource {
    pub name: String,
    pub resource_type: ResourceInterfaceKind,
    pub processing_rate: f64,
    pub scheduling: SchedulingPolicy,
}

/// Deployment target for allocation groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ResourceContainer {
    pub name: String,
    pub resources: Vec<ProcessingResource>,
}

impl ResourceContainer {
    fn with_cpu(name: String) -> Self {
        Self {
            name,
            resources: vec![ProcessingResource {
                name: "CPU".to_string(),
                resource_type: ResourceInterfaceKind::Cpu,
                processing_rate: DEFAULT_CPU_RATE,
                scheduling: SchedulingPolicy::ProcessorSharing,
            }],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ResourceEnvironment {
    pub name: String,
    pub containers: Vec<ResourceContainer>,
}

impl ResourceEnvironment {
    /// Single `ApplicationServer` container with one processor-sharing CPU.
    pub fn default_layout() -> Self {
        Self::with_containers(1)
    }

    /// `count` containers; the first is `ApplicationServer`, the rest `Server_<k>`.
    pub fn with_containers(count: usize) -> Self {
        let containers = (0..count)
            .map(|k| {
                let name = if k == 0 {
                    DEFAULT_CONTAINER_NAME.to_string()
                } else {
                    format!("Server_{}", k + 1)
                };
                ResourceContainer::with_cpu(name)
            })
            .collect();
        Self {
            name: "Environment".to_string(),
            containers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_interfaces_take_double_amount() {
        let std_defs = StandardDefinitions::new();
        for kind in [ResourceInterfaceKind::Cpu, ResourceInterfaceKind::Hdd] {
            let interface = std_defs.resource_interface(kind);
            assert!(!interface.signatures.is_empty());
            for signature in &interface.signatures {
                assert_eq!(signature.parameters.len(), 1);
                assert_eq!(signature.parameters[0].kind, PrimitiveKind::Double);
                assert!(signature.return_type.is_none());
            }
        }
        assert_eq!(std_defs.hdd_interface.signatures.len(), 2);
    }

    #[test]
    fn test_default_layout_has_application_server() {
        let env = ResourceEnvironment::default_layout();
        assert_eq!(env.containers.len(), 1);
        assert_eq!(env.containers[0].name, "ApplicationServer");
        assert_eq!(
            env.containers[0].resources[0].scheduling,
            SchedulingPolicy::ProcessorSharing
        );
    }

    #[test]
    fn test_with_containers_names_extra_servers() {
        let env = ResourceEnvironment::with_containers(3);
        let names: Vec<_> = env.containers.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["ApplicationServer", "Server_2", "Server_3"]);
        assert!(ResourceEnvironment::with_containers(0).containers.is_empty());
    }

    #[test]
    fn test_fresh_instances_are_independent() {
        let mut first = StandardDefinitions::new();
        let second = StandardDefinitions::new();
        first.cpu_interface.name.push_str("_changed");
        assert_eq!(second.cpu_interface.name, "ICPU");
    }
}
