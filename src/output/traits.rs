//! Batch delivery trait and staging summaries

use crate::model::ParsedArea;
use crate::Result;

/// Counts of records written by one staging pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StagingSummary {
    pub areas: u64,
    pub sectors: u64,
    pub routes: u64,
    pub images: u64,
}

impl StagingSummary {
    /// Creates a new empty summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the counts of another pass
    pub fn absorb(&mut self, other: StagingSummary) {
        self.areas += other.areas;
        self.sectors += other.sectors;
        self.routes += other.routes;
        self.images += other.images;
    }

    pub fn is_empty(&self) -> bool {
        self.areas == 0
    }
}

/// Consumer of finished area batches
///
/// The crawler hands each batch over by value and waits for `deliver` to
/// return before it continues, so a batch is fully consumed before the
/// next one is built.
pub trait BatchSink {
    /// Receives one batch of parsed areas
    ///
    /// # Arguments
    ///
    /// * `areas` - The areas completed since the previous delivery
    ///
    /// # Returns
    ///
    /// An error aborts the crawl. The checkpoint has already been saved.
    fn deliver(&mut self, areas: Vec<ParsedArea>) -> Result<()>;
}

impl<F> BatchSink for F
where
    F: FnMut(Vec<ParsedArea>) -> Result<()>,
{
    fn deliver(&mut self, areas: Vec<ParsedArea>) -> Result<()> {
        self(areas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_absorb() {
        let mut total = StagingSummary::new();
        assert!(total.is_empty());

        total.absorb(StagingSummary {
            areas: 1,
            sectors: 3,
            routes: 20,
            images: 1,
        });
        total.absorb(StagingSummary {
            areas: 2,
            sectors: 1,
            routes: 4,
            images: 0,
        });

        assert_eq!(total.areas, 3);
        assert_eq!(total.sectors, 4);
        assert_eq!(total.routes, 24);
        assert_eq!(total.images, 1);
    }

    #[test]
    fn test_closure_sink() {
        let mut received = Vec::new();
        {
            let mut sink = |areas: Vec<ParsedArea>| -> Result<()> {
                received.extend(areas.into_iter().map(|a| a.name));
                Ok(())
            };
            let area = ParsedArea {
                name: "Siurana".to_string(),
                ..Default::default()
            };
            sink.deliver(vec![area]).unwrap();
        }
        assert_eq!(received, vec!["Siurana"]);
    }
}
