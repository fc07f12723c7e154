// 测试夹具：在临时目录中生成审核信息表格与模板。
#![allow(dead_code)]

use anyhow::Result;
use rust_xlsxwriter::Workbook;
use serde_json::{json, Value};
use std::path::Path;

pub type SheetRows = Vec<Vec<&'static str>>;

pub fn write_workbook(path: &Path, sheets: &[(&str, SheetRows)]) -> Result<()> {
    let mut workbook = Workbook::new();
    for (name, rows) in sheets {
        let sheet = workbook.add_worksheet();
        sheet.set_name(*name)?;
        for (row, cells) in rows.iter().enumerate() {
            for (col, text) in cells.iter().enumerate() {
                if text.is_empty() {
                    continue;
                }
                sheet.write_string(row as u32, col as u16, *text)?;
            }
        }
    }
    workbook.save(path)?;
    Ok(())
}

pub fn write_audit_workbook(path: &Path) -> Result<()> {
    write_workbook(path, &audit_sheets())
}

/// 完整的审核表格：数据库、信息、过程清单，外加填充页使文件清单落在第 9 张。
pub fn audit_sheets() -> Vec<(&'static str, SheetRows)> {
    let mut sheets = vec![
        ("数据库", database_rows()),
        ("信息", info_rows()),
        ("过程清单", process_rows()),
    ];
    for name in ["封面", "说明", "审核计划", "签到表", "附录"] {
        sheets.push((name, vec![vec!["备注"]]));
    }
    sheets.push(("文件清单", document_rows()));
    sheets
}

pub fn database_rows() -> SheetRows {
    vec![
        vec!["组织名称", "深圳示例科技有限公司"],
        vec!["审核开始日期", "2024年3月5日"],
        vec!["审核结束日期", "2024-03-07"],
        vec!["姓名", "姓名：ZHANG San 张三"],
        vec!["审核员CCAA", "CCAA: 2021-IATF-0042"],
        vec!["认证机构标识号", "CB-0099"],
        vec!["IATF USI", "1234567"],
        vec!["行业代码", "29.3"],
        vec!["员工总数", "350"],
        vec!["联系人", "李雷"],
        vec!["联系电话", "0755-12345678"],
        vec!["电子邮箱", "0"],
        vec!["邮政编码", "518057"],
        vec!["证书范围", "汽车电子零部件的设计和制造"],
        vec!["顾客", "一汽大众"],
        vec!["供应商编码", "FAW-001"],
    ]
}

pub fn info_rows() -> SheetRows {
    let site_header = vec![
        "现场名称",
        "英文名称 English Name",
        "现场地址",
        "英文地址 English Address",
        "支持功能",
    ];
    vec![
        vec!["审核地址", "广东省深圳市南山区科技园路8号"],
        vec!["", "No. 8 Keji Road, Nanshan District, Shenzhen, Guangdong, China"],
        vec!["IATF卡号", "IATF: 0123456"],
        vec![],
        vec!["顾客信息"],
        vec!["顾客名称 Customer Name", "供应商编码", "CSR文件名称", "CSR文件日期"],
        vec!["上汽大众", "SV1001", "大众CSR", "2024/1/15"],
        vec!["比亚迪", "BYD-77", "比亚迪CSR", ""],
        vec![],
        vec!["扩展现场 Extended Manufacturing Sites"],
        vec![
            "扩展现场名称",
            "英文名称 English Name",
            "扩展现场地址",
            "英文地址 English Address",
            "邮编",
            "员工人数",
        ],
        vec![
            "一厂",
            "Plant 1",
            "深圳市宝安区一路1号",
            "1 Yi Road, Baoan, Shenzhen, Guangdong, China",
            "518100",
            "120",
        ],
        vec![
            "二厂",
            "Plant 2",
            "东莞市长安镇二路2号",
            "2 Er Road, Changan, Dongguan, Guangdong, China",
            "523000",
            "80",
        ],
        vec![],
        vec!["提供支持的现场 Providing Support Sites"],
        site_header.clone(),
        vec![
            "上海研发中心",
            "Shanghai R&D Center",
            "上海市浦东新区三路3号",
            "3 San Road, Pudong, Shanghai, Shanghai, China",
            "设计开发",
        ],
        vec![],
        vec!["接受支持的现场 Receiving Support Sites"],
        site_header,
    ]
}

fn process_row(name: &'static str, owner: &'static str, marks: [&'static str; 3]) -> Vec<&'static str> {
    let mut row = vec![""; 13];
    row[0] = name;
    row[2] = owner;
    row.extend(marks);
    row
}

pub fn process_rows() -> SheetRows {
    vec![
        process_row("过程名称", "负责人", ["4.1", "4.2", "8.3"]),
        process_row("设计开发", "王五", ["X", "", "true"]),
        process_row("生产制造", "赵六", ["", "x", ""]),
    ]
}

pub fn document_rows() -> SheetRows {
    vec![
        vec!["条款", "公司内对应的程序文件（包含名称、编号、版本）"],
        vec!["4.1", "质量手册 QM-01"],
        vec!["4.2", "文件控制程序 QP-02"],
        vec!["4.3", ""],
        vec!["4.4", "记录控制程序 QP-03"],
    ]
}

pub fn base_template() -> Value {
    json!({
        "AuditData": {
            "AuditTeam": [{ "Name": "模板审核员", "Role": "Lead" }]
        },
        "OrganizationInformation": {
            "OrganizationName": "模板公司",
            "Email": "template@example.com",
            "ExtendedManufacturingSites": [{ "SiteName": "模板现场" }],
            "ProvidingSupportSites": [],
            "ReceivingSupportSites": [{ "SiteName": "模板接受支持现场" }],
            "LanguageByManufacturingPersonnel": [{ "Language": "Chinese", "Products": "模板产品" }]
        },
        "CustomerInformation": { "Customers": [{ "Name": "模板顾客" }] },
        "Stage1DocumentedRequirements": {
            "IatfClauseDocuments": [
                { "Clause": "4.1" },
                { "Clause": "4.2" },
                { "Clause": "4.3" },
                { "Clause": "4.4" }
            ]
        },
        "Processes": [{ "ProcessName": "模板过程" }],
        "Results": {}
    })
}
