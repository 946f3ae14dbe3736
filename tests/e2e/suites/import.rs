//! 数据导入测试套件
//!
//! 外部服务导出的 JSON（原始字段名）经映射后驱动权益推导和订单查询。

use bakery_shared::AppConfig;
use chrono::NaiveDate;
use serde_json::json;
use storefront::cli::CommandRunner;
use storefront::mapping::ImportPayload;

fn export() -> serde_json::Value {
    json!({
        "usuarios": [
            {
                "id": 1,
                "nombre": "Carmen",
                "apellido": "Soto",
                "correo": "carmen@duoc.cl",
                "tipoUsuario": "cliente",
                "fechaRegistro": "2024-03-10T12:00:00Z",
                "datosExtra": {
                    "fechaNacimiento": "1965-08-20",
                    "tortaGratisCumpleanosUsada": true
                }
            },
            {
                "id": 2,
                "nombre": "Jorge",
                "correo": "jorge@gmail.com",
                "datosExtra": { "codigoPromocional": "FELICES50" }
            }
        ],
        "boletas": [
            {
                "id": 100,
                "usuarioId": 1,
                "fecha": "2025-12-24",
                "total": 21000,
                "subtotal": 42000,
                "descuentoUsuario": 21000,
                "estado": "completado",
                "detalles": [
                    { "productoId": 2, "nombreProducto": "Torta Circular de Manjar", "cantidad": 1, "precioUnitario": 42000 }
                ]
            },
            {
                "id": 101,
                "usuarioId": 2,
                "total": 4500,
                "items": [
                    { "productoId": 5, "cantidad": 1, "precioUnitario": 5000 }
                ]
            }
        ]
    })
}

#[tokio::test]
async fn test_import_export_file() {
    let payload: ImportPayload = serde_json::from_value(export()).unwrap();
    let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();

    let report = CommandRunner::new(AppConfig::default())
        .import(payload, today)
        .await
        .unwrap();

    assert_eq!(report["imported"]["users"], 2);
    assert_eq!(report["imported"]["receipts"], 2);

    let carmen = &report["users"][0];
    assert_eq!(carmen["profile"]["discountPercent"], 50);
    assert_eq!(carmen["profile"]["birthday"]["used"], true);
    assert_eq!(carmen["profile"]["birthday"]["yearUsed"], 2024);
    assert_eq!(carmen["spent"], 21000);

    let jorge = &report["users"][1];
    assert_eq!(jorge["profile"]["discountPercent"], 10);
    assert_eq!(jorge["profile"]["birthday"]["available"], false);
    assert_eq!(jorge["orders"], 1);
}
