//! Exact cosine ranking over an embedding matrix.

use memory_embeddings::cosine_similarity;

use crate::content::EmbeddingMatrix;

/// A matrix row and its similarity to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredRow {
    /// Row index (insertion position)
    pub index: usize,
    /// Cosine similarity in [-1, 1]; 0.0 when either vector has zero norm
    pub score: f32,
}

/// Rank every row of `matrix` against `query` and keep the best `k`.
///
/// Scores are sorted descending. The sort is stable, so rows with equal
/// scores keep insertion order (earlier rows win ties). `k` larger than the
/// row count returns every row.
pub fn rank(matrix: &EmbeddingMatrix, query: &[f32], k: usize) -> Vec<ScoredRow> {
    if k == 0 {
        return Vec::new();
    }

    let mut scored: Vec<ScoredRow> = matrix
        .iter_rows()
        .enumerate()
        .map(|(index, row)| {
            let score = cosine_similarity(row, query);
            ScoredRow {
                index,
                score: if score.is_nan() { f32::NEG_INFINITY } else { score },
            }
        })
        .collect();

    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(k);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use memory_embeddings::Embedding;

    use crate::content::CacheContent;

    fn matrix(rows: &[Vec<f32>]) -> EmbeddingMatrix {
        let mut content = CacheContent::new(rows[0].len());
        for (i, row) in rows.iter().enumerate() {
            content
                .push(format!("row {i}"), &Embedding::new(row.clone()))
                .unwrap();
        }
        content.embeddings().clone()
    }

    #[test]
    fn test_rank_descending() {
        let m = matrix(&[
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
            vec![-1.0, 0.0],
        ]);
        let ranked = rank(&m, &[1.0, 0.0], 4);
        let order: Vec<usize> = ranked.iter().map(|r| r.index).collect();
        assert_eq!(order, vec![1, 2, 0, 3]);
        for pair in ranked.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        assert!((ranked[0].score - 1.0).abs() < 1e-6);
        assert!((ranked[3].score + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_rank_truncates_to_k() {
        let m = matrix(&[vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]]);
        assert_eq!(rank(&m, &[1.0, 0.0], 2).len(), 2);
        assert_eq!(rank(&m, &[1.0, 0.0], 10).len(), 3);
        assert!(rank(&m, &[1.0, 0.0], 0).is_empty());
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let m = matrix(&[
            vec![0.0, 0.0, 1.0],
            vec![0.0, 1.0, 0.0],
            vec![0.0, 0.0, 2.0],
            vec![0.0, 3.0, 0.0],
        ]);
        // Query orthogonal to everything: all scores tie at 0
        let ranked = rank(&m, &[1.0, 0.0, 0.0], 4);
        let order: Vec<usize> = ranked.iter().map(|r| r.index).collect();
        assert_eq!(order, vec![0, 1, 2, 3]);

        // Rows 0 and 2 tie at 1.0, row 0 first
        let ranked = rank(&m, &[0.0, 0.0, 1.0], 2);
        assert_eq!(ranked[0].index, 0);
        assert_eq!(ranked[1].index, 2);
    }

    #[test]
    fn test_zero_query_scores_zero() {
        let m = matrix(&[vec![1.0, 0.0], vec![0.0, 1.0]]);
        let ranked = rank(&m, &[0.0, 0.0], 2);
        assert!(ranked.iter().all(|r| r.score == 0.0));
        assert_eq!(ranked[0].index, 0);
    }

    #[test]
    fn test_empty_matrix() {
        let m = EmbeddingMatrix::empty(3);
        assert!(rank(&m, &[1.0, 0.0, 0.0], 3).is_empty());
    }
}
