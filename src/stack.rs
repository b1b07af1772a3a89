use std::array;
use std::fmt;

/// A fixed-capacity LIFO stack stored inline.
pub struct Stack<T, const N: usize>
where
    T: Default + Sized + Copy,
{
    data: [T; N],
    size: usize,
}

impl<T, const N: usize> fmt::Debug for Stack<T, N>
where
    T: Default + Sized + Copy + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stack")
            .field("data", &&self.data[..self.size])
            .field("size", &self.size)
            .finish()
    }
}

impl<T, const N: usize> Stack<T, N>
where
    T: Default + Sized + Copy,
{
    pub fn new() -> Self {
        Self {
            data: array::from_fn(|_| Default::default()),
            size: 0,
        }
    }

    pub fn push(&mut self, value: T) {
        if self.size == N {
            panic!("Stack max size - {N} is exceeded");
        }
        self.data[self.size] = value;
        self.size += 1;
    }

    pub fn pop(&mut self) -> Option<T> {
        (self.size > 0).then(|| {
            self.size -= 1;
            self.data[self.size]
        })
    }
}
