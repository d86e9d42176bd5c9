use crate::error::{Result, SearchError};
use crate::fusion::ScoredResult;
use regscope_corpus::PassageStore;
use regscope_protocol::RetrievedPassage;

/// Turns ranked results into output records with denormalized passage metadata
pub struct ResultAssembler;

impl ResultAssembler {
    pub fn assemble(
        scored: &[ScoredResult],
        passages: &dyn PassageStore,
    ) -> Result<Vec<RetrievedPassage>> {
        scored
            .iter()
            .map(|result| {
                let passage = passages
                    .get(&result.passage.id)
                    .ok_or_else(|| SearchError::MissingPassage(result.passage.id.clone()))?;
                Ok(RetrievedPassage {
                    text: passage.text.clone(),
                    source_document: passage.source_document.clone(),
                    page: passage.page,
                    section_id: passage.section_id.clone(),
                    final_score: result.final_score,
                    rank: result.rank,
                })
            })
            .collect()
    }
}
