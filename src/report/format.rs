//! Terminal listing of an evaluated template.
//!
//! Header lines start with `#` so the output can be fed straight into
//! plotting tools; rows are `epoch value error` for trusted epochs only.

use crate::domain::{Band, Curve, EvalOptions};
use crate::surface::SurfaceKind;

/// What the listing describes.
#[derive(Debug, Clone, Copy)]
pub struct ListingContext {
    pub dm15: f64,
    pub band: Band,
    pub surface: SurfaceKind,
    pub options: EvalOptions,
}

/// Header comment block.
pub fn format_header(ctx: &ListingContext) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "# This is csptemp v{}, using the {} surface\n",
        env!("CARGO_PKG_VERSION"),
        ctx.surface.display_name()
    ));
    out.push_str(&format!(
        "# Constructed light curve template for dm15={:.3} mag, filter={}\n",
        ctx.dm15, ctx.band
    ));
    if ctx.options.redshift != 0.0 {
        out.push_str(&format!("# Epochs are observer-frame at z={}\n", ctx.options.redshift));
    }

    let (value, error) = if ctx.band.is_color_model() || ctx.options.as_magnitude {
        ("M-M(max)", "sigma[M-M(max)]")
    } else {
        ("f/f(max)", "sigma[f/f(max)]")
    };
    out.push_str("# Columns:\n");
    out.push_str("#  1    t(Bmax)\n");
    out.push_str(&format!("#  2-3  {value}   {error}\n"));
    out
}

/// One row per trusted epoch.
pub fn format_rows(epochs: &[f64], curve: &Curve) -> String {
    let mut out = String::new();
    for (i, &t) in epochs.iter().enumerate() {
        if curve.mask.get(i).copied().unwrap_or(false) {
            out.push_str(&format!("{t:.1} {:.6} {:.6}\n", curve.value[i], curve.error[i]));
        }
    }
    out
}

/// Header followed by rows.
pub fn format_listing(ctx: &ListingContext, epochs: &[f64], curve: &Curve) -> String {
    let mut out = format_header(ctx);
    out.push_str(&format_rows(epochs, curve));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_skips_masked_epochs() {
        let ctx = ListingContext {
            dm15: 1.1,
            band: Band::B,
            surface: SurfaceKind::Spline,
            options: EvalOptions::default(),
        };
        let curve = Curve {
            value: vec![0.5, 0.0, 0.25],
            error: vec![0.03, 0.02, 9.99],
            mask: vec![true, true, false],
        };

        let txt = format_listing(&ctx, &[-10.0, 0.0, 70.5], &curve);
        let expected = format!(
            concat!(
                "# This is csptemp v{}, using the bivariate spline surface\n",
                "# Constructed light curve template for dm15=1.100 mag, filter=B\n",
                "# Columns:\n",
                "#  1    t(Bmax)\n",
                "#  2-3  M-M(max)   sigma[M-M(max)]\n",
                "-10.0 0.500000 0.030000\n",
                "0.0 0.000000 0.020000\n",
            ),
            env!("CARGO_PKG_VERSION")
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn flux_header_mentions_redshift() {
        let ctx = ListingContext {
            dm15: 1.5,
            band: Band::R,
            surface: SurfaceKind::Gloes,
            options: EvalOptions::flux().with_redshift(0.05),
        };
        let header = format_header(&ctx);
        assert!(header.contains("using the GLoEs surface"));
        assert!(header.contains("z=0.05"));
        assert!(header.contains("f/f(max)"));
    }
}
