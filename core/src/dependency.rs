//! The Dependency Analyzer: a full sweep of the memory image that, per
//! output pin, discovers which inputs it functionally depends on and
//! which inputs gate its output-enable (§4.2).

use crate::image::MemoryImage;
use crate::pin::Pin;

/// Fills `depends`, `oe_depends`, `seen_high`, `seen_low` on every output
/// pin by scanning every `(address, input pin)` pair exactly once with
/// that input low, comparing against the same address with it high.
///
/// `on_address` is called after each outer-loop address completes; it is
/// a pure side effect (progress reporting) and never influences the
/// results, per §5.
pub fn analyze_dependencies(
    image: &MemoryImage,
    inputs: &[Pin],
    outputs: &mut [Pin],
    mut on_address: impl FnMut(u32, u32),
) {
    let total = image.len() as u32;

    for addr in 0..total {
        for ip in inputs {
            if addr & ip.bit_mask != 0 {
                continue;
            }
            let addr0 = addr;
            let addr1 = addr | ip.bit_mask;
            let d0 = image.get(addr0);
            let d1 = image.get(addr1);

            for op in outputs.iter_mut() {
                if op.hiz_probe_bit_mask != 0
                    && (addr0 & op.hiz_probe_bit_mask != 0 || addr1 & op.hiz_probe_bit_mask != 0)
                {
                    continue;
                }

                let is_hiz0 = is_hiz(image, addr0, d0, op.bit_mask, op.hiz_probe_bit_mask);
                let is_hiz1 = is_hiz(image, addr1, d1, op.bit_mask, op.hiz_probe_bit_mask);

                if is_hiz0 != is_hiz1 {
                    op.oe_depends.add(ip.bit_mask, &ip.name);
                }

                if !is_hiz0 && !is_hiz1 && (d0 & op.bit_mask) != (d1 & op.bit_mask) {
                    op.depends.add(ip.bit_mask, &ip.name);
                }

                if !is_hiz0 {
                    mark_seen(op, d0 & op.bit_mask != 0);
                }
                if !is_hiz1 {
                    mark_seen(op, d1 & op.bit_mask != 0);
                }
            }
        }
        on_address(addr, total);
    }
}

#[inline]
fn is_hiz(image: &MemoryImage, addr: u32, data: u32, pin_mask: u32, probe_mask: u32) -> bool {
    if probe_mask == 0 {
        return false;
    }
    (data & pin_mask) != (image.get(addr ^ probe_mask) & pin_mask)
}

#[inline]
fn mark_seen(op: &mut Pin, high: bool) {
    if high {
        op.seen_high = true;
    } else {
        op.seen_low = true;
    }
}
