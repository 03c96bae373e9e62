//! Benchmarks comparing TieredVec with std::Vec using divan.
//!
//! Run with: `cargo bench`

use tiered_vec::TieredVec;

fn main() {
    divan::main();
}

// Trait to abstract over Vec and TieredVec for generic benchmarks
trait VecLike<T>: Default {
    fn push(&mut self, val: T);
    fn pop(&mut self) -> Option<T>;
    fn get(&self, idx: usize) -> Option<&T>;
    fn len(&self) -> usize;
    fn iter<'a>(&'a self) -> impl Iterator<Item = &'a T>
    where
        T: 'a;
}

impl<T> VecLike<T> for Vec<T> {
    fn push(&mut self, val: T) {
        self.push(val);
    }
    fn pop(&mut self) -> Option<T> {
        self.pop()
    }
    fn get(&self, idx: usize) -> Option<&T> {
        <[T]>::get(self, idx)
    }
    fn len(&self) -> usize {
        self.len()
    }
    fn iter<'a>(&'a self) -> impl Iterator<Item = &'a T>
    where
        T: 'a,
    {
        <[T]>::iter(self)
    }
}

impl<T, const N: u32> VecLike<T> for TieredVec<T, N> {
    fn push(&mut self, val: T) {
        TieredVec::push(self, val);
    }
    fn pop(&mut self) -> Option<T> {
        TieredVec::pop(self)
    }
    fn get(&self, idx: usize) -> Option<&T> {
        TieredVec::get(self, idx)
    }
    fn len(&self) -> usize {
        TieredVec::len(self)
    }
    fn iter<'a>(&'a self) -> impl Iterator<Item = &'a T>
    where
        T: 'a,
    {
        TieredVec::iter(self)
    }
}

fn filled<V: VecLike<i32>>(n: usize) -> V {
    let mut v = V::default();
    for i in 0..n as i32 {
        v.push(i);
    }
    v
}

// ============================================================================
// Push / Pop Benchmarks
// ============================================================================

#[divan::bench(types = [Vec<i32>, TieredVec<i32>, TieredVec<i32, 4>], consts = [100, 1000, 10000])]
fn push<V: VecLike<i32>, const N: usize>() -> V {
    filled(N)
}

#[divan::bench(types = [Vec<i32>, TieredVec<i32>, TieredVec<i32, 4>], consts = [100, 1000, 10000])]
fn pop<V: VecLike<i32>, const N: usize>(bencher: divan::Bencher) {
    bencher
        .with_inputs(|| filled::<V>(N))
        .bench_local_values(|mut v| {
            while v.pop().is_some() {}
            v
        });
}

#[divan::bench(types = [Vec<i32>, TieredVec<i32>, TieredVec<i32, 4>], consts = [1000, 10000])]
fn push_pop_oscillation<V: VecLike<i32>, const N: usize>(bencher: divan::Bencher) {
    bencher
        .with_inputs(|| filled::<V>(N))
        .bench_local_refs(|v| {
            for i in 0..64 {
                v.push(i);
                v.pop();
            }
        });
}

// ============================================================================
// Access Benchmarks
// ============================================================================

#[divan::bench(types = [Vec<i32>, TieredVec<i32>, TieredVec<i32, 4>], consts = [100, 1000, 10000])]
fn sequential_read<V: VecLike<i32>, const N: usize>(bencher: divan::Bencher) {
    bencher.with_inputs(|| filled::<V>(N)).bench_local_refs(|v| {
        let mut sum = 0i64;
        for i in 0..v.len() {
            sum += *v.get(i).unwrap_or(&0) as i64;
        }
        sum
    });
}

#[divan::bench(types = [Vec<i32>, TieredVec<i32>, TieredVec<i32, 4>], consts = [1000, 10000])]
fn random_read<V: VecLike<i32>, const N: usize>(bencher: divan::Bencher) {
    bencher.with_inputs(|| filled::<V>(N)).bench_local_refs(|v| {
        // Linear congruential walk over the index space
        let mut idx = 0usize;
        let mut sum = 0i64;
        for _ in 0..N {
            idx = (idx.wrapping_mul(1103515245).wrapping_add(12345)) % N;
            sum += *v.get(idx).unwrap_or(&0) as i64;
        }
        sum
    });
}

#[divan::bench(types = [Vec<i32>, TieredVec<i32>, TieredVec<i32, 4>], consts = [100, 1000, 10000])]
fn iterate<V: VecLike<i32>, const N: usize>(bencher: divan::Bencher) {
    bencher
        .with_inputs(|| filled::<V>(N))
        .bench_local_refs(|v| v.iter().map(|&x| x as i64).sum::<i64>());
}
