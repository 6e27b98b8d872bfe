//! Exhaustive cross-validated hyperparameter search.
//!
//! Every candidate in the grid is fitted on `k - 1` folds and scored on the
//! held-out fold, for each of the `k` folds. Folds are contiguous and
//! unshuffled. The candidate with the best mean score (the earlier one on
//! a tie) is then refitted on all rows.

use std::ops::Range;
use std::time::Instant;

use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::dataset::LabelMatrix;
use crate::error::{Result, TriageError};
use crate::ml::Estimator;

/// Cross-validation outcome of one grid candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateResult<P> {
    pub params: P,
    /// Score on each held-out fold, in fold order.
    pub fold_scores: Vec<f64>,
    pub mean_score: f64,
    /// Population standard deviation of the fold scores.
    pub std_score: f64,
    /// 1 for the best mean score; equal means share a rank.
    pub rank: usize,
    /// Wall-clock seconds spent fitting and scoring all folds.
    pub elapsed_secs: f64,
}

/// Held-out row ranges of a `k`-fold split of `n` rows.
///
/// The first `n % k` folds get one extra row.
pub fn kfold(n: usize, k: usize) -> Result<Vec<Range<usize>>> {
    if k < 2 {
        return Err(TriageError::invalid_config(format!(
            "cross-validation needs at least 2 folds, got {k}"
        )));
    }
    if n < k {
        return Err(TriageError::training(format!(
            "cannot split {n} rows into {k} folds"
        )));
    }

    let mut folds = Vec::with_capacity(k);
    let mut start = 0;
    for fold in 0..k {
        let size = n / k + usize::from(fold < n % k);
        folds.push(start..start + size);
        start += size;
    }
    Ok(folds)
}

fn select_texts(texts: &[String], rows: &[usize]) -> Vec<String> {
    rows.iter().map(|&i| texts[i].clone()).collect()
}

/// Grid search over an [`Estimator`]'s parameters.
#[derive(Debug, Clone)]
pub struct GridSearch<E: Estimator> {
    estimator: E,
    param_grid: Vec<E::Params>,
    n_folds: usize,
    cv_results: Vec<CandidateResult<E::Params>>,
    best_index: Option<usize>,
    best_estimator: Option<E>,
}

impl<E: Estimator> GridSearch<E> {
    /// Create a search over `param_grid` with `n_folds`-fold cross-validation.
    pub fn new(estimator: E, param_grid: Vec<E::Params>, n_folds: usize) -> Result<Self> {
        if param_grid.is_empty() {
            return Err(TriageError::invalid_config("parameter grid is empty"));
        }
        if n_folds < 2 {
            return Err(TriageError::invalid_config(format!(
                "cross-validation needs at least 2 folds, got {n_folds}"
            )));
        }

        Ok(Self {
            estimator,
            param_grid,
            n_folds,
            cv_results: Vec::new(),
            best_index: None,
            best_estimator: None,
        })
    }

    pub fn param_grid(&self) -> &[E::Params] {
        &self.param_grid
    }

    pub fn n_folds(&self) -> usize {
        self.n_folds
    }

    pub fn cv_results(&self) -> &[CandidateResult<E::Params>] {
        &self.cv_results
    }

    pub fn best_params(&self) -> Option<&E::Params> {
        self.best_index.map(|i| &self.param_grid[i])
    }

    pub fn best_score(&self) -> Option<f64> {
        self.best_index.map(|i| self.cv_results[i].mean_score)
    }

    /// The best candidate refitted on all rows.
    pub fn best_estimator(&self) -> Option<&E> {
        self.best_estimator.as_ref()
    }

    pub fn into_best_estimator(self) -> Result<E> {
        self.best_estimator
            .ok_or_else(|| TriageError::model("grid search is not fitted"))
    }

    /// Cross-validate every candidate, then refit the best one on all rows.
    ///
    /// Each fit gets its own seed drawn from `rng` in a fixed order, so a
    /// seeded search is reproducible.
    pub fn fit(&mut self, texts: &[String], labels: &LabelMatrix, rng: &mut StdRng) -> Result<()> {
        if texts.len() != labels.n_rows() {
            return Err(TriageError::training(format!(
                "{} texts but {} label rows",
                texts.len(),
                labels.n_rows()
            )));
        }

        let n = texts.len();
        let folds = kfold(n, self.n_folds)?;
        let k = folds.len();
        info!(
            "Fitting {} folds for each of {} candidates, totalling {} fits",
            k,
            self.param_grid.len(),
            k * self.param_grid.len()
        );

        let mut results = Vec::with_capacity(self.param_grid.len());
        for params in &self.param_grid {
            let started = Instant::now();
            let mut fold_scores = Vec::with_capacity(k);

            for (i, test) in folds.iter().enumerate() {
                let fold_started = Instant::now();
                let train: Vec<usize> = (0..test.start).chain(test.end..n).collect();
                let test: Vec<usize> = test.clone().collect();

                let mut candidate = self.estimator.clone();
                candidate.set_params(params);
                let mut fold_rng = StdRng::seed_from_u64(rng.random());
                candidate.fit(
                    &select_texts(texts, &train),
                    &labels.select_rows(&train),
                    &mut fold_rng,
                )?;
                let score =
                    candidate.score(&select_texts(texts, &test), &labels.select_rows(&test))?;

                info!(
                    "[CV {}/{}] END {}; score={:.3} total time={:.1}s",
                    i + 1,
                    k,
                    params,
                    score,
                    fold_started.elapsed().as_secs_f64()
                );
                fold_scores.push(score);
            }

            let mean_score = fold_scores.iter().sum::<f64>() / k as f64;
            let variance = fold_scores
                .iter()
                .map(|s| (s - mean_score).powi(2))
                .sum::<f64>()
                / k as f64;
            results.push(CandidateResult {
                params: params.clone(),
                fold_scores,
                mean_score,
                std_score: variance.sqrt(),
                rank: 0,
                elapsed_secs: started.elapsed().as_secs_f64(),
            });
        }

        let means: Vec<f64> = results.iter().map(|r| r.mean_score).collect();
        for result in &mut results {
            result.rank = 1 + means.iter().filter(|&&m| m > result.mean_score).count();
        }

        let mut best_index = 0;
        for (i, result) in results.iter().enumerate() {
            if result.mean_score > results[best_index].mean_score {
                best_index = i;
            }
        }
        let best_params = &self.param_grid[best_index];
        info!(
            "Best parameters: {} (mean score {:.3})",
            best_params, results[best_index].mean_score
        );

        let mut best = self.estimator.clone();
        best.set_params(best_params);
        let mut refit_rng = StdRng::seed_from_u64(rng.random());
        best.fit(texts, labels, &mut refit_rng)?;

        self.cv_results = results;
        self.best_index = Some(best_index);
        self.best_estimator = Some(best);
        Ok(())
    }

    /// Predict with the refitted best estimator.
    pub fn predict(&self, texts: &[String]) -> Result<LabelMatrix> {
        self.best_estimator
            .as_ref()
            .ok_or_else(|| TriageError::model("grid search is not fitted"))?
            .predict(texts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    /// Predicts `bias` for every label; scores best when it matches the data.
    #[derive(Debug, Clone)]
    struct ConstantEstimator {
        bias: u8,
        fitted_rows: usize,
    }

    #[derive(Debug, Clone, PartialEq, Serialize)]
    struct Bias(u8);

    impl fmt::Display for Bias {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "bias={}", self.0)
        }
    }

    impl Estimator for ConstantEstimator {
        type Params = Bias;

        fn params(&self) -> Bias {
            Bias(self.bias)
        }

        fn set_params(&mut self, params: &Bias) {
            self.bias = params.0;
        }

        fn fit(&mut self, texts: &[String], _: &LabelMatrix, _: &mut StdRng) -> Result<()> {
            self.fitted_rows = texts.len();
            Ok(())
        }

        fn predict(&self, texts: &[String]) -> Result<LabelMatrix> {
            let rows = vec![vec![self.bias]; texts.len()];
            LabelMatrix::from_rows(&rows, 1)
        }
    }

    fn data(n: usize, ones: usize) -> (Vec<String>, LabelMatrix) {
        let texts = (0..n).map(|i| format!("text {i}")).collect();
        let rows: Vec<Vec<u8>> = (0..n).map(|i| vec![u8::from(i < ones)]).collect();
        (texts, LabelMatrix::from_rows(&rows, 1).unwrap())
    }

    fn estimator() -> ConstantEstimator {
        ConstantEstimator {
            bias: 0,
            fitted_rows: 0,
        }
    }

    #[test]
    fn test_kfold_sizes() {
        let folds = kfold(12, 5).unwrap();
        let sizes: Vec<usize> = folds.iter().map(|f| f.len()).collect();

        assert_eq!(sizes, vec![3, 3, 2, 2, 2]);
        assert_eq!(folds[0].start, 0);
        assert_eq!(folds[4].end, 12);
        assert!(kfold(3, 5).is_err());
        assert!(kfold(10, 1).is_err());
    }

    #[test]
    fn test_best_candidate_is_refitted_on_all_rows() {
        let (texts, labels) = data(10, 0);
        let mut search =
            GridSearch::new(estimator(), vec![Bias(1), Bias(0)], 5).unwrap();

        search.fit(&texts, &labels, &mut StdRng::seed_from_u64(0)).unwrap();

        assert_eq!(search.best_params(), Some(&Bias(0)));
        assert_eq!(search.best_score(), Some(1.0));
        assert_eq!(search.best_estimator().unwrap().fitted_rows, 10);
        assert_eq!(search.cv_results()[0].rank, 2);
        assert_eq!(search.cv_results()[1].rank, 1);
        assert_eq!(search.cv_results()[1].fold_scores.len(), 5);
    }

    #[test]
    fn test_ties_go_to_the_earlier_candidate() {
        let (texts, labels) = data(10, 0);
        let mut search =
            GridSearch::new(estimator(), vec![Bias(0), Bias(0)], 2).unwrap();

        search.fit(&texts, &labels, &mut StdRng::seed_from_u64(0)).unwrap();

        assert_eq!(search.best_index, Some(0));
        assert!(search.cv_results().iter().all(|r| r.rank == 1));
    }

    #[test]
    fn test_folds_are_unshuffled() {
        // the first fold holds exactly the positive rows
        let (texts, labels) = data(10, 5);
        let mut search = GridSearch::new(estimator(), vec![Bias(1)], 2).unwrap();

        search.fit(&texts, &labels, &mut StdRng::seed_from_u64(0)).unwrap();

        assert_eq!(search.cv_results()[0].fold_scores, vec![1.0, 0.0]);
        assert_eq!(search.cv_results()[0].std_score, 0.5);
    }

    #[test]
    fn test_invalid_grid() {
        assert!(GridSearch::new(estimator(), Vec::new(), 5).is_err());
        assert!(GridSearch::new(estimator(), vec![Bias(0)], 1).is_err());

        let search = GridSearch::new(estimator(), vec![Bias(0)], 2).unwrap();
        assert!(search.predict(&["x".to_string()]).is_err());
    }

    #[test]
    fn test_too_few_rows_for_folds() {
        let (texts, labels) = data(3, 0);
        let mut search = GridSearch::new(estimator(), vec![Bias(0)], 5).unwrap();

        assert!(search.fit(&texts, &labels, &mut StdRng::seed_from_u64(0)).is_err());
    }
}
