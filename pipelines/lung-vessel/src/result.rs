//! 运行结果.

use crate::profile::Profile;
use std::io::{self, Write};

/// 将 `p` 的结果写进 `w` 中.
fn describe_into<W: Write>(p: &Profile, w: &mut W) -> io::Result<()> {
    const S4: &str = "    ";

    #[inline]
    fn f64_to_display(f: Option<f64>) -> String {
        match f {
            Some(f) => format!("{f:.6}"),
            None => "/".to_string(),
        }
    }

    #[inline]
    fn u64_to_display(u: Option<u64>) -> String {
        match u {
            Some(u) => u.to_string(),
            None => "/".to_string(),
        }
    }

    writeln!(w, "Batch summary:")?;
    writeln!(w, "{S4}Processed slices: {}", p.get_processed())?;
    writeln!(w, "{S4}Slices without lung contour: {}", p.get_empty())?;
    writeln!(w, "{S4}Failed slices: {}", p.get_failed())?;
    writeln!(w, "{S4}Mean vessel %: {}", f64_to_display(p.get_avg_ratio()))?;
    writeln!(w, "{S4}Denoised vessel pixels: {}", p.get_denoised())?;
    writeln!(w, "{S4}Total slice time: {} ms", p.get_slice_time_ms())?;
    writeln!(
        w,
        "{S4}Average slice time: {} ms",
        f64_to_display(p.get_avg_slice_time_ms())
    )?;
    writeln!(w, "{S4}Total machine time: {} ms", p.get_real_time_ms())?;
    let t = p.get_most_time_consuming().map(|d| d.as_millis() as u64);
    write!(w, "{S4}Most time-consuming slice costs {} ms", u64_to_display(t))?;
    Ok(())
}

/// 分析运行结果, 输出到标准输出.
pub fn analyze(p: &Profile) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    utils::sep_to(&mut out)?;
    describe_into(p, &mut out)?;
    writeln!(out)?;
    utils::sep_to(&mut out)
}
