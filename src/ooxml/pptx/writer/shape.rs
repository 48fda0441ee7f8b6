/// Shape XML for tables and pictures.
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::namespace;
use crate::ooxml::xml::escape_xml;
use crate::template::{Geometry, Grid};
use std::fmt::Write as FmtWrite;

/// Write a `p:graphicFrame` holding an `a:tbl` for `grid`.
///
/// Columns take the widths computed by the grid and every row gets an
/// equal share of the frame height. Empty cells are written with an
/// end-of-paragraph marker only.
pub fn write_table_frame(
    xml: &mut String,
    shape_id: u32,
    geometry: Geometry,
    grid: &Grid,
) -> Result<()> {
    let rows = grid.row_count();
    let row_height = if rows == 0 {
        0
    } else {
        geometry.cy / rows as i64
    };

    xml.push_str("<p:graphicFrame>");
    xml.push_str("<p:nvGraphicFramePr>");
    write!(
        xml,
        r#"<p:cNvPr id="{}" name="Table {}"/>"#,
        shape_id,
        shape_id.saturating_sub(1)
    )
    .map_err(|e| OoxmlError::Xml(e.to_string()))?;
    xml.push_str(r#"<p:cNvGraphicFramePr><a:graphicFrameLocks noGrp="1"/></p:cNvGraphicFramePr>"#);
    xml.push_str("<p:nvPr/>");
    xml.push_str("</p:nvGraphicFramePr>");

    xml.push_str("<p:xfrm>");
    write_transform(xml, geometry)?;
    xml.push_str("</p:xfrm>");

    xml.push_str("<a:graphic>");
    write!(xml, r#"<a:graphicData uri="{}">"#, namespace::DML_TABLE)
        .map_err(|e| OoxmlError::Xml(e.to_string()))?;
    xml.push_str("<a:tbl>");
    write!(
        xml,
        r#"<a:tblPr firstRow="{}" firstCol="{}" bandRow="1"/>"#,
        u8::from(grid.has_header()),
        u8::from(grid.has_row_names())
    )
    .map_err(|e| OoxmlError::Xml(e.to_string()))?;

    xml.push_str("<a:tblGrid>");
    for width in grid.column_widths() {
        write!(xml, r#"<a:gridCol w="{}"/>"#, width)
            .map_err(|e| OoxmlError::Xml(e.to_string()))?;
    }
    xml.push_str("</a:tblGrid>");

    for row in 0..rows {
        write!(xml, r#"<a:tr h="{}">"#, row_height)
            .map_err(|e| OoxmlError::Xml(e.to_string()))?;
        for col in 0..grid.column_count() {
            write_cell(xml, grid.cell(row, col));
        }
        xml.push_str("</a:tr>");
    }

    xml.push_str("</a:tbl>");
    xml.push_str("</a:graphicData>");
    xml.push_str("</a:graphic>");
    xml.push_str("</p:graphicFrame>");
    Ok(())
}

fn write_cell(xml: &mut String, text: &str) {
    xml.push_str("<a:tc><a:txBody><a:bodyPr/><a:lstStyle/><a:p>");
    if text.is_empty() {
        xml.push_str(r#"<a:endParaRPr lang="en-US" dirty="0"/>"#);
    } else {
        xml.push_str(r#"<a:r><a:rPr lang="en-US" dirty="0"/><a:t>"#);
        xml.push_str(&escape_xml(text));
        xml.push_str("</a:t></a:r>");
    }
    xml.push_str("</a:p></a:txBody><a:tcPr/></a:tc>");
}

/// Write a `p:pic` showing the image behind relationship `r_id`,
/// stretched over `geometry`.
pub fn write_picture(
    xml: &mut String,
    shape_id: u32,
    geometry: Geometry,
    r_id: &str,
    description: &str,
) -> Result<()> {
    xml.push_str("<p:pic>");
    xml.push_str("<p:nvPicPr>");
    write!(
        xml,
        r#"<p:cNvPr id="{}" name="Picture {}" descr="{}"/>"#,
        shape_id,
        shape_id.saturating_sub(1),
        escape_xml(description)
    )
    .map_err(|e| OoxmlError::Xml(e.to_string()))?;
    xml.push_str(r#"<p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr>"#);
    xml.push_str("<p:nvPr/>");
    xml.push_str("</p:nvPicPr>");

    xml.push_str("<p:blipFill>");
    write!(xml, r#"<a:blip r:embed="{}"/>"#, escape_xml(r_id))
        .map_err(|e| OoxmlError::Xml(e.to_string()))?;
    xml.push_str("<a:stretch><a:fillRect/></a:stretch>");
    xml.push_str("</p:blipFill>");

    xml.push_str("<p:spPr>");
    xml.push_str("<a:xfrm>");
    write_transform(xml, geometry)?;
    xml.push_str("</a:xfrm>");
    xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
    xml.push_str("</p:spPr>");
    xml.push_str("</p:pic>");
    Ok(())
}

fn write_transform(xml: &mut String, geometry: Geometry) -> Result<()> {
    write!(xml, r#"<a:off x="{}" y="{}"/>"#, geometry.x, geometry.y)
        .map_err(|e| OoxmlError::Xml(e.to_string()))?;
    write!(xml, r#"<a:ext cx="{}" cy="{}"/>"#, geometry.cx, geometry.cy)
        .map_err(|e| OoxmlError::Xml(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{LabeledTable, TableOptions};

    fn geometry() -> Geometry {
        Geometry {
            x: 10,
            y: 20,
            cx: 3000,
            cy: 900,
        }
    }

    #[test]
    fn test_table_frame() {
        let table = LabeledTable::from_rows(
            vec!["a".to_string(), "b & c".to_string()],
            vec![vec!["1".to_string(), "2".to_string()]],
        )
        .unwrap();
        let options = TableOptions::new().with_header(true);
        let grid = Grid::build(&table, &options, 3000).unwrap();

        let mut xml = String::new();
        write_table_frame(&mut xml, 5, geometry(), &grid).unwrap();

        assert!(xml.starts_with("<p:graphicFrame>"));
        assert!(xml.contains(r#"<p:cNvPr id="5" name="Table 4"/>"#));
        assert!(xml.contains(r#"<a:off x="10" y="20"/><a:ext cx="3000" cy="900"/>"#));
        assert!(xml.contains(r#"firstRow="1" firstCol="0""#));
        assert_eq!(xml.matches(r#"<a:gridCol w="1500"/>"#).count(), 2);
        assert_eq!(xml.matches(r#"<a:tr h="450">"#).count(), 2);
        assert!(xml.contains("<a:t>b &amp; c</a:t>"));
        assert!(xml.ends_with("</p:graphicFrame>"));
    }

    #[test]
    fn test_empty_cell_has_end_marker() {
        let mut xml = String::new();
        write_cell(&mut xml, "");
        assert!(xml.contains("<a:endParaRPr"));
        assert!(!xml.contains("<a:t>"));
    }

    #[test]
    fn test_cell_drops_control_characters() {
        let mut xml = String::new();
        write_cell(&mut xml, "net\u{1}\u{8}10");
        assert!(xml.contains("<a:t>net10</a:t>"));
        assert!(!xml.contains('\u{1}'));
    }

    #[test]
    fn test_picture() {
        let mut xml = String::new();
        write_picture(&mut xml, 8, geometry(), "rId3", "chart \"Q3\"").unwrap();
        assert!(xml.contains(r#"descr="chart &quot;Q3&quot;""#));
        assert!(xml.contains(r#"<a:blip r:embed="rId3"/>"#));
        assert!(xml.contains(r#"<a:ext cx="3000" cy="900"/>"#));
    }
}
