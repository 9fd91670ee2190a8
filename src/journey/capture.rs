//! `CaptureScope`: the mutable capture surface exposed to journey step
//! bodies. Scoped to exactly one step; must not be reused across steps.

use std::time::Instant;

use tracing::instrument;

use crate::capture::StepCaptureData;
use crate::driver::{ControlChannel, Tab};
use crate::error::BrowserError;
use crate::probes::{cwv, resources};

use super::navigation::NavigationTracker;

/// Bound to one page and the repetition's navigation tracker for the
/// duration of a single step.
pub struct CaptureScope<'a> {
    tab: &'a dyn Tab,
    tracker: &'a mut NavigationTracker,
    data: &'a mut StepCaptureData,
    control: Option<Box<dyn ControlChannel>>,
    interaction_start: Option<Instant>,
}

impl<'a> CaptureScope<'a> {
    pub fn new(
        tab: &'a dyn Tab,
        tracker: &'a mut NavigationTracker,
        data: &'a mut StepCaptureData,
    ) -> Self {
        CaptureScope {
            tab,
            tracker,
            data,
            control: None,
            interaction_start: None,
        }
    }

    #[instrument(skip(self))]
    pub async fn cwv(&mut self) -> Result<(), BrowserError> {
        self.data.cwv = Some(cwv::collect(self.tab).await?);
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn resources(&mut self) -> Result<(), BrowserError> {
        self.data.resources = Some(resources::collect(self.tab).await?);
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn navigation(&mut self) -> Result<(), BrowserError> {
        self.data.navigation = Some(self.tracker.capture_and_classify(self.tab).await?);
        Ok(())
    }

    /// Lazily acquires the control-channel session on first use.
    #[instrument(skip(self))]
    pub async fn memory(&mut self) -> Result<(), BrowserError> {
        if self.control.is_none() {
            self.control = Some(self.tab.control_channel().await?);
        }
        let bytes = self.control.as_ref().unwrap().heap_usage_bytes().await?;
        self.data.memory = Some(bytes);
        Ok(())
    }

    pub fn start_interaction(&mut self) {
        self.interaction_start = Some(Instant::now());
    }

    pub fn end_interaction(&mut self) {
        if let Some(start) = self.interaction_start.take() {
            self.data.interaction = Some(start.elapsed().as_secs_f64() * 1000.0);
        }
    }

    pub fn mark(&mut self, name: impl Into<String>, value: f64) {
        self.data.custom.insert(name.into(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_writes_into_custom_map() {
        let mut data = StepCaptureData::default();
        let mut tracker = NavigationTracker::new();
        struct NullTab;
        #[async_trait::async_trait]
        impl Tab for NullTab {
            async fn goto(&self, _: &str, _: crate::driver::LoadCondition) -> Result<(), BrowserError> {
                unimplemented!()
            }
            async fn wait_for_selector(&self, _: &str) -> Result<(), BrowserError> {
                unimplemented!()
            }
            async fn click(&self, _: &str) -> Result<(), BrowserError> {
                unimplemented!()
            }
            async fn type_into(&self, _: &str, _: &str) -> Result<(), BrowserError> {
                unimplemented!()
            }
            async fn evaluate(&self, _: &str) -> Result<serde_json::Value, BrowserError> {
                unimplemented!()
            }
            async fn inject_before_navigation(&self, _: &str) -> Result<(), BrowserError> {
                unimplemented!()
            }
            async fn control_channel(&self) -> Result<Box<dyn ControlChannel>, BrowserError> {
                unimplemented!()
            }
            async fn close(self: Box<Self>) -> Result<(), BrowserError> {
                unimplemented!()
            }
        }
        let tab = NullTab;
        let mut scope = CaptureScope::new(&tab, &mut tracker, &mut data);
        scope.mark("custom-timer", 42.0);
        assert_eq!(data.custom.get("custom-timer"), Some(&42.0));
    }
}
