/// Call `f` on every permutation of `values`, stopping at the first error.
///
/// The callback is fallible so that abort checkpoints inside the
/// permutation search can cut the whole enumeration short.
pub fn for_each_permutation_of<T, E, F>(values: &mut [T], mut f: F) -> Result<(), E>
where
    F: FnMut(&[T]) -> Result<(), E>,
{
    if values.is_empty() {
        Ok(())
    } else {
        permutations(values, &mut f, values.len())
    }
}

// https://www.geeksforgeeks.org/heaps-algorithm-for-generating-permutations/
fn permutations<T, E, F>(values: &mut [T], f: &mut F, size: usize) -> Result<(), E>
where
    F: FnMut(&[T]) -> Result<(), E>,
{
    if size == 1 {
        f(values)
    } else {
        for i in 0..size {
            permutations(values, f, size - 1)?;

            if size % 2 == 1 {
                values.swap(0, size - 1);
            } else {
                values.swap(i, size - 1);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashSet;
    use std::convert::Infallible;

    fn collect(values: &mut [i32]) -> HashSet<Vec<i32>> {
        let mut got = HashSet::new();
        for_each_permutation_of(values, |p| -> Result<(), Infallible> {
            got.insert(p.to_vec());
            Ok(())
        })
        .unwrap();
        got
    }

    #[test]
    fn check_empty() {
        assert!(collect(&mut []).is_empty());
    }

    #[test]
    fn check_1() {
        let exp = [vec![1]].into_iter().collect::<HashSet<_>>();
        assert_eq!(collect(&mut [1]), exp);
    }

    #[test]
    fn check_12() {
        let exp = [vec![1, 2], vec![2, 1]].into_iter().collect::<HashSet<_>>();
        assert_eq!(collect(&mut [1, 2]), exp);
    }

    #[test]
    fn check_123() {
        let got = collect(&mut [1, 2, 3]);
        assert_eq!(got.len(), 6);
        assert!(got.contains(&vec![3, 1, 2]));
    }

    #[test]
    fn check_12345() {
        assert_eq!(collect(&mut [1, 2, 3, 4, 5]).len(), 5 * 4 * 3 * 2);
    }

    #[test]
    fn errors_stop_the_enumeration() {
        let mut count = 0;
        let res = for_each_permutation_of(&mut [1, 2, 3], |_| {
            count += 1;
            if count == 2 { Err("stop") } else { Ok(()) }
        });
        assert_eq!(res, Err("stop"));
        assert_eq!(count, 2);
    }
}
