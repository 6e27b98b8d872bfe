//! Shuffled train/test partitioning.

use log::debug;
use rand::Rng;
use rand::seq::SliceRandom;

use crate::dataset::MessageDataset;
use crate::error::{Result, TriageError};

/// Number of test rows for `n` rows and a test fraction.
///
/// The test side is rounded up, the train side gets the rest.
pub fn test_rows(n: usize, test_size: f64) -> usize {
    (test_size * n as f64).ceil() as usize
}

/// Split a dataset into shuffled train and test subsets.
///
/// Rows are permuted with `rng`; the first `ceil(n * test_size)` rows of
/// the permutation form the test set and the remainder the train set.
/// There is no stratification. Both sides must end up non-empty.
pub fn train_test_split<R: Rng + ?Sized>(
    dataset: &MessageDataset,
    test_size: f64,
    rng: &mut R,
) -> Result<(MessageDataset, MessageDataset)> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(TriageError::invalid_argument(format!(
            "test size must be in (0, 1), got {test_size}"
        )));
    }

    let n = dataset.len();
    let n_test = test_rows(n, test_size);
    if n_test == 0 || n_test >= n {
        return Err(TriageError::training(format!(
            "cannot split {n} rows with test size {test_size}: \
             both train and test sets must be non-empty"
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);
    let (test, train) = indices.split_at(n_test);

    debug!("Split {n} rows into {} train / {} test", train.len(), test.len());

    Ok((dataset.select(train), dataset.select(test)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::LabelMatrix;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn dataset(n: usize) -> MessageDataset {
        let rows: Vec<Vec<u8>> = (0..n).map(|i| vec![(i % 2) as u8]).collect();
        MessageDataset::new(
            (0..n).map(|i| format!("message {i}")).collect(),
            vec!["related".to_string()],
            LabelMatrix::from_rows(&rows, 1).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_split_sizes_round_test_up() {
        let mut rng = StdRng::seed_from_u64(7);
        let (train, test) = train_test_split(&dataset(11), 0.2, &mut rng).unwrap();

        assert_eq!(test.len(), 3);
        assert_eq!(train.len(), 8);
    }

    #[test]
    fn test_split_is_a_partition() {
        let data = dataset(20);
        let mut rng = StdRng::seed_from_u64(42);
        let (train, test) = train_test_split(&data, 0.25, &mut rng).unwrap();

        let mut all: Vec<String> = train.messages.into_iter().chain(test.messages).collect();
        all.sort();
        let mut expected = data.messages.clone();
        expected.sort();
        assert_eq!(all, expected);
    }

    #[test]
    fn test_labels_follow_their_messages() {
        let data = dataset(10);
        let mut rng = StdRng::seed_from_u64(3);
        let (train, _) = train_test_split(&data, 0.2, &mut rng).unwrap();

        for (i, message) in train.messages.iter().enumerate() {
            let original: usize = message.trim_start_matches("message ").parse().unwrap();
            assert_eq!(train.labels.get(i, 0), (original % 2) as u8);
        }
    }

    #[test]
    fn test_same_seed_same_split() {
        let data = dataset(30);
        let first = train_test_split(&data, 0.2, &mut StdRng::seed_from_u64(9)).unwrap();
        let second = train_test_split(&data, 0.2, &mut StdRng::seed_from_u64(9)).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_degenerate_splits_are_rejected() {
        let mut rng = StdRng::seed_from_u64(1);

        assert!(train_test_split(&dataset(1), 0.2, &mut rng).is_err());
        assert!(train_test_split(&dataset(0), 0.2, &mut rng).is_err());
        assert!(train_test_split(&dataset(10), 0.0, &mut rng).is_err());
        assert!(train_test_split(&dataset(10), 1.0, &mut rng).is_err());
    }
}
