use crate::metrics::DimensionSummary;
use crate::model::{Block, CM, Rule};

use super::styles::{self, MEDIUM_GRAY, PRIMARY};

const SECTIONS: [(&str, &str); 5] = [
    ("I.", "Introducción y Marco Conceptual"),
    ("II.", "Indicadores de Nivel de Cumplimiento"),
    ("III.", "Panorama General por Dimensión"),
    ("IV.", "Porcentaje de Indicadores Atendidos por Dimensión"),
    ("V.", "Subdimensiones por Dimensión"),
];

const COMPLEMENTARY: [&str; 4] = [
    "Composición por Sexo",
    "Brecha Salarial por Categoría",
    "Quejas de Acoso y Hostigamiento",
    "Atenciones a Mujeres",
];

pub fn table_of_contents(dimensions: &[DimensionSummary]) -> Vec<Block> {
    let toc = &styles::TOC;
    let sub = &styles::TOC_SUBSECTION;
    let numbered = |num: &str, desc: &str| {
        Block::Paragraph(toc.paragraph(vec![toc.run(num).bold(), toc.run(format!(" {desc}"))]))
    };

    let mut blocks = vec![
        Block::Spacer(2.0 * CM),
        Block::Paragraph(styles::H1.text("ÍNDICE")),
        Block::Spacer(0.5 * CM),
        Block::Rule(Rule {
            thickness: 2.0,
            color: PRIMARY,
            space_before: 0.0,
            space_after: 20.0,
        }),
    ];
    blocks.extend(SECTIONS.iter().map(|(num, desc)| numbered(num, desc)));

    blocks.push(Block::Spacer(0.3 * CM));
    blocks.push(Block::Paragraph(toc.paragraph(vec![
        toc.run("VI. Análisis por Dimensión").bold(),
    ])));
    for (idx, dim) in dimensions.iter().enumerate() {
        blocks.push(Block::Paragraph(sub.text(format!("{}. {}", idx + 1, dim.nombre))));
    }

    blocks.push(Block::Spacer(0.3 * CM));
    blocks.push(numbered("VII.", "Datos Complementarios"));
    for item in COMPLEMENTARY {
        blocks.push(Block::Paragraph(sub.text(format!("• {item}"))));
    }

    blocks.push(Block::Spacer(1.0 * CM));
    blocks.push(Block::Rule(Rule {
        thickness: 1.0,
        color: MEDIUM_GRAY,
        space_before: 0.0,
        space_after: 0.0,
    }));
    blocks.push(Block::PageBreak);
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::summarize;
    use crate::payload::Dimension;

    fn texts(blocks: &[Block]) -> Vec<String> {
        blocks
            .iter()
            .filter_map(|b| match b {
                Block::Paragraph(p) => Some(p.plain_text()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn lists_every_dimension_in_order() {
        let dims: Vec<_> = ["Formación", "Investigación"]
            .iter()
            .enumerate()
            .map(|(i, n)| {
                summarize(
                    &Dimension {
                        nombre: n.to_string(),
                        ..Default::default()
                    },
                    i + 1,
                )
            })
            .collect();
        let t = texts(&table_of_contents(&dims));
        assert_eq!(t[0], "ÍNDICE");
        assert_eq!(t[1], "I. Introducción y Marco Conceptual");
        assert_eq!(t[6], "VI. Análisis por Dimensión");
        assert_eq!(t[7], "1. Formación");
        assert_eq!(t[8], "2. Investigación");
        assert_eq!(t[9], "VII. Datos Complementarios");
        assert_eq!(t.last().map(String::as_str), Some("• Atenciones a Mujeres"));
    }

    #[test]
    fn ends_with_page_break() {
        assert!(matches!(table_of_contents(&[]).last(), Some(Block::PageBreak)));
    }
}
