//! Kubernetes `Ingress` rule source.

use async_trait::async_trait;
use k8s_openapi::api::networking::v1::{HTTPIngressPath, Ingress};
use kube::api::{Api, ListParams};
use kube::Client;

use crate::rules::model::{PathRoute, RoutingRule, RuleSet, ServicePort};
use crate::rules::source::{ListError, RuleSource};

/// Lists `networking.k8s.io/v1` ingresses across all namespaces.
#[derive(Clone)]
pub struct KubeIngressSource {
    api: Api<Ingress>,
}

impl KubeIngressSource {
    pub fn new(client: Client) -> Self {
        Self {
            api: Api::all(client),
        }
    }

    /// Build a source from the in-cluster or kubeconfig environment.
    pub async fn try_default() -> Result<Self, kube::Error> {
        let client = Client::try_default().await?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl RuleSource for KubeIngressSource {
    async fn list(&self) -> Result<RuleSet, ListError> {
        let list = self.api.list(&ListParams::default()).await?;
        tracing::debug!(ingresses = list.items.len(), "Listed ingresses");
        Ok(rules_from_ingresses(&list.items))
    }
}

/// Flatten ingresses into rules, one per `spec.rules[]` entry, keeping order.
///
/// A missing host maps to an empty hostname; the synthesizer drops it as
/// invalid. Paths without a service backend are skipped here since there is
/// nothing to route them to.
pub fn rules_from_ingresses(ingresses: &[Ingress]) -> RuleSet {
    let mut rules = Vec::new();

    for ingress in ingresses {
        let namespace = ingress.metadata.namespace.clone().unwrap_or_default();
        let Some(spec_rules) = ingress.spec.as_ref().and_then(|s| s.rules.as_ref()) else {
            continue;
        };

        for rule in spec_rules {
            let paths = rule
                .http
                .as_ref()
                .map(|http| http.paths.iter().filter_map(|p| path_route(&namespace, p)).collect())
                .unwrap_or_default();

            rules.push(RoutingRule {
                namespace: namespace.clone(),
                host: rule.host.clone().unwrap_or_default(),
                paths,
            });
        }
    }

    RuleSet::new(rules)
}

fn path_route(namespace: &str, path: &HTTPIngressPath) -> Option<PathRoute> {
    let Some(service) = path.backend.service.as_ref() else {
        tracing::warn!(
            namespace,
            path = ?path.path,
            "Skipping ingress path without a service backend"
        );
        return None;
    };

    let port = match service.port.as_ref() {
        Some(p) => match (p.number, p.name.as_ref()) {
            (Some(n), _) => ServicePort::Number(n),
            (None, Some(name)) => ServicePort::Name(name.clone()),
            (None, None) => {
                tracing::warn!(namespace, service = %service.name, "Skipping ingress path with empty service port");
                return None;
            }
        },
        None => {
            tracing::warn!(namespace, service = %service.name, "Skipping ingress path without service port");
            return None;
        }
    };

    Some(PathRoute {
        path: path.path.clone().unwrap_or_default(),
        service: service.name.clone(),
        port,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::networking::v1::{
        HTTPIngressRuleValue, IngressBackend, IngressRule, IngressServiceBackend, IngressSpec,
        ServiceBackendPort,
    };
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn ingress(namespace: &str, host: Option<&str>, paths: Vec<HTTPIngressPath>) -> Ingress {
        Ingress {
            metadata: ObjectMeta {
                namespace: Some(namespace.to_string()),
                ..Default::default()
            },
            spec: Some(IngressSpec {
                rules: Some(vec![IngressRule {
                    host: host.map(str::to_string),
                    http: Some(HTTPIngressRuleValue { paths }),
                }]),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn service_path(path: &str, service: &str, port: ServiceBackendPort) -> HTTPIngressPath {
        HTTPIngressPath {
            path: Some(path.to_string()),
            path_type: "Prefix".to_string(),
            backend: IngressBackend {
                service: Some(IngressServiceBackend {
                    name: service.to_string(),
                    port: Some(port),
                }),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_ingresses_flatten_in_order() {
        let items = vec![
            ingress(
                "default",
                Some("foo"),
                vec![service_path(
                    "/",
                    "foo",
                    ServiceBackendPort { number: Some(3000), name: None },
                )],
            ),
            ingress(
                "staging",
                Some("bar"),
                vec![service_path(
                    "/my/path",
                    "bar",
                    ServiceBackendPort { number: None, name: Some("http".into()) },
                )],
            ),
        ];

        let set = rules_from_ingresses(&items);
        assert_eq!(
            set,
            RuleSet::new(vec![
                RoutingRule::new("default", "foo", vec![PathRoute::new("/", "foo", 3000)]),
                RoutingRule::new(
                    "staging",
                    "bar",
                    vec![PathRoute::new("/my/path", "bar", ServicePort::Name("http".into()))]
                ),
            ])
        );
    }

    #[test]
    fn test_missing_host_maps_to_empty() {
        let set = rules_from_ingresses(&[ingress("default", None, vec![])]);
        assert_eq!(set.rules[0].host, "");
        assert!(set.rules[0].paths.is_empty());
    }

    #[test]
    fn test_resource_backend_is_skipped() {
        let path = HTTPIngressPath {
            path: Some("/static".into()),
            path_type: "Prefix".into(),
            backend: IngressBackend::default(),
        };
        let set = rules_from_ingresses(&[ingress("default", Some("foo"), vec![path])]);
        assert!(set.rules[0].paths.is_empty());
    }
}
