use super::{RemediationError, Remediator};
use crate::gcp::billing::BillingApi;
use crate::gcp::compute::ComputeApi;
use std::fmt::Display;
use tracing::{error, info, warn};

#[derive(Debug, PartialEq, Clone)]
pub struct StoppedInstance {
    pub zone: String,
    pub name: String,
}

impl Display for StoppedInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.zone, self.name)
    }
}

impl<C, B> Remediator<C, B>
where
    C: ComputeApi,
    B: BillingApi,
{
    /// Stops every running instance of the project, one at a time and zone by zone.
    /// The first error aborts the remaining zones and instances.
    pub fn stop_running_instances(&self) -> Result<Vec<StoppedInstance>, RemediationError> {
        let project = self.project_id.as_str();
        info!(project_id = project, "checking project for running instances");

        let zones = self
            .compute
            .list_zones(project)
            .map_err(RemediationError::ListZones)?;

        let mut stopped = Vec::new();
        for zone in zones {
            let Some(zone) = zone.name else {
                warn!("encountered a zone without name, skipping");
                continue;
            };

            let instances = self
                .compute
                .list_instances(project, &zone)
                .map_err(|source| RemediationError::ListInstances {
                    zone: zone.clone(),
                    source,
                })?;

            for instance in instances.into_iter().filter(|i| i.is_running()) {
                let Some(name) = instance.name else {
                    error!(%zone, "cannot stop a running instance without name");
                    continue;
                };
                info!(project_id = project, %zone, instance = %name, "stopping instance");
                self.compute
                    .stop_instance(project, &zone, &name)
                    .map_err(|source| RemediationError::StopInstance {
                        zone: zone.clone(),
                        instance: name.clone(),
                        source,
                    })?;
                info!(%zone, instance = %name, "instance stopped successfully");
                stopped.push(StoppedInstance {
                    zone: zone.clone(),
                    name,
                });
            }
        }
        Ok(stopped)
    }
}
