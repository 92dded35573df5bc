use crate::models::{PriceTable, COLUMNS};
use csv::WriterBuilder;

/// Excel 打开时依赖 BOM 识别 UTF-8
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// 导出价格表为 CSV (分号分隔, UTF-8 带 BOM, 含表头)
pub fn export_to_csv(table: &PriceTable) -> Result<Vec<u8>, csv::Error> {
    let mut buf = UTF8_BOM.to_vec();
    {
        let mut writer = WriterBuilder::new().delimiter(b';').from_writer(&mut buf);
        writer.write_record(COLUMNS)?;
        for row in &table.rows {
            writer.write_record(row.cells())?;
        }
        writer.flush()?;
    }
    Ok(buf)
}

/// 下载文件名 `<价格表编号>.csv`
pub fn csv_file_name(price_table_id: &str) -> String {
    let safe: String = price_table_id
        .chars()
        .map(|c| match c {
            '"' | '\\' | '/' | '\r' | '\n' => '_',
            c => c,
        })
        .collect();
    format!("{}.csv", safe)
}
