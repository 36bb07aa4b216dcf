//! Fermionic sign of a fully contracted operator product.
//!
//! Given a product of creation and destruction operators in which every
//! operator has been assigned a definite eigenmode, the expectation value in
//! a Slater determinant that the product maps back onto itself is a pure
//! sign: pair each operator with the next one acting on the same mode, and
//! count how many other operators each partner has to be moved past to
//! become adjacent.

use crate::operators::{ Kind, Record };

/// Contract an operator history given in application order (first-applied
/// operator first).
///
/// Diagonal records are ignored. The remaining operators are put in written
/// order and repeatedly the leftmost one is paired with the next operator on
/// the same `(flavor, mode)`, picking up `(-1)^k` for the `k` unpaired
/// operators strictly between them. The result is `0` if some operator has
/// no partner or is paired with an operator of the same [`Kind`], and `±1`
/// otherwise.
///
/// Whether each adjacent pair is compatible with the occupation of the state
/// being contracted against is *not* checked here; callers only submit
/// histories that were generated by valid occupation toggles.
pub fn resolve(history: &[Record]) -> i32 {
    let ops: Vec<(Kind, usize, usize)>
        = history.iter().rev()
        .filter_map(|rec| match *rec {
            Record::Mode { kind, flavor, mode } => Some((kind, flavor, mode)),
            Record::Diagonal => None,
        })
        .collect();
    if ops.len() % 2 != 0 { return 0; }
    let mut paired: Vec<bool> = vec![false; ops.len()];
    let mut sign: i32 = 1;
    for i in 0..ops.len() {
        if paired[i] { continue; }
        let (kind, flavor, mode) = ops[i];
        let mut between: usize = 0;
        let mut partner: Option<usize> = None;
        for (j, &(k, f, m)) in ops.iter().enumerate().skip(i + 1) {
            if paired[j] { continue; }
            if (f, m) == (flavor, mode) {
                if k == kind { return 0; }
                partner = Some(j);
                break;
            }
            between += 1;
        }
        let Some(j) = partner else { return 0; };
        paired[i] = true;
        paired[j] = true;
        if between % 2 == 1 { sign = -sign; }
    }
    sign
}
