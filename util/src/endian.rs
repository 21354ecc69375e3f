use bytemuck::{self as bm, Pod, Zeroable};

fn to_native<T: Pod>(mut x: T, stored_little: bool) -> T {
    if stored_little != cfg!(target_endian = "little") {
        bm::bytes_of_mut(&mut x).reverse();
    }
    x
}

/// A `T` stored big-endian.
#[repr(transparent)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct Be<T>(T) where T: Pod;

/// A `T` stored little-endian.
#[repr(transparent)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct Le<T>(T) where T: Pod;

impl<T> std::fmt::Debug for Be<T> where T: Pod + std::fmt::Debug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} (be)", self.get())
    }
}

impl<T> std::fmt::Debug for Le<T> where T: Pod + std::fmt::Debug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} (le)", self.get())
    }
}

impl<T> Be<T> where T: Pod {
    pub fn get(self) -> T {
        to_native(self.0, false)
    }
}

impl<T> Le<T> where T: Pod {
    pub fn get(self) -> T {
        to_native(self.0, true)
    }
}

impl<T> From<T> for Be<T> where T: Pod {
    fn from(x: T) -> Self {
        Be(to_native(x, false))
    }
}

impl<T> From<T> for Le<T> where T: Pod {
    fn from(x: T) -> Self {
        Le(to_native(x, true))
    }
}

#[cfg(test)]
#[test]
fn byte_order() {
    let be: Be<u32> = bm::pod_read_unaligned(&[0x12, 0x34, 0x56, 0x78]);
    let le: Le<u32> = bm::pod_read_unaligned(&[0x12, 0x34, 0x56, 0x78]);
    assert_eq!(be.get(), 0x1234_5678);
    assert_eq!(le.get(), 0x7856_3412);

    assert_eq!(bm::bytes_of(&Be::from(0x0102u16)), &[1, 2]);
    assert_eq!(bm::bytes_of(&Le::from(0x0102u16)), &[2, 1]);

    let neg: Le<i16> = bm::pod_read_unaligned(&[0x00, 0x80]);
    assert_eq!(neg.get(), i16::MIN);
}
