//! Data-parallel fan-out over dense task ids.

use rayon::prelude::*;

/// Run `task(i)` for every `i` in `0..count` and collect the results in
/// index order.
///
/// With `parallel` set the tasks run on the rayon pool and the call blocks
/// until all of them finish. Otherwise they run serially on the calling
/// thread. Both paths return the same vector. A panicking task propagates
/// to the caller.
///
/// # Example
///
/// ```
/// let squares = mesh_types::fan_out(4, true, |i| i * i);
/// assert_eq!(squares, vec![0, 1, 4, 9]);
/// ```
pub fn fan_out<T, F>(count: usize, parallel: bool, task: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
{
    if parallel {
        (0..count).into_par_iter().map(task).collect()
    } else {
        (0..count).map(task).collect()
    }
}
